//! Interactive session for parkfinder
//!
//! This module contains the prompt loop: choosing a state, listing its
//! national sites, and showing places near a chosen site. Input and output
//! are generic so sessions can be scripted.

use std::io::{BufRead, Write};

use crate::cache::CacheStore;
use crate::cli::StartupConfig;
use crate::data::{NearbyPlace, NpsClient, PlacesClient, Site, StateIndex};
use crate::error::AppError;

const STATE_PROMPT: &str = "Enter a state name (e.g. Michigan, michigan) or exit: ";
const SITE_PROMPT: &str = "Choose the number of detail search or 'exit' or 'back': ";

/// A command typed at a prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// End the session
    Exit,
    /// Return to state selection
    Back,
    /// A whole number, used to pick a site
    Number(usize),
    /// Anything else, such as a state name
    Text(String),
}

/// Classifies one line of input
///
/// Surrounding whitespace is ignored and `exit`/`back` match in any case.
/// Digit strings too large for `usize` stay `Text`.
pub fn parse_command(line: &str) -> Command {
    let input = line.trim();
    if input.eq_ignore_ascii_case("exit") {
        Command::Exit
    } else if input.eq_ignore_ascii_case("back") {
        Command::Back
    } else if !input.is_empty() && input.bytes().all(|b| b.is_ascii_digit()) {
        input
            .parse()
            .map(Command::Number)
            .unwrap_or_else(|_| Command::Text(input.to_string()))
    } else {
        Command::Text(input.to_string())
    }
}

/// The sites of one state, as listed to the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listing {
    /// State name as the user typed it
    pub state: String,
    /// Sites in listing order
    pub sites: Vec<Site>,
}

/// Application state enum representing the current prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppState {
    /// Waiting for a state name
    StateSelection,
    /// A state's sites have been listed; waiting for a site number
    SiteListing(Listing),
    /// Places near the site at the given index have been shown
    PlaceDetail(Listing, usize),
    /// The session is over
    Exited,
}

/// Main application struct owning the cache and clients for one session
pub struct App {
    /// Current application state
    pub state: AppState,
    /// States known from the home page
    state_index: StateIndex,
    /// Response cache shared by every fetch
    cache: CacheStore,
    /// nps.gov client
    nps_client: NpsClient,
    /// Places API client
    places_client: PlacesClient,
}

impl App {
    /// Creates an App from startup configuration, building the state index
    pub async fn from_config(config: &StartupConfig) -> Result<Self, AppError> {
        let cache = CacheStore::open(&config.cache_file);
        let nps_client = NpsClient::with_base_url(&config.base_url)?;
        if config.api_key.is_none() {
            tracing::warn!("no MapQuest API key configured, only cached nearby places are available");
        }
        let places_client = PlacesClient::new(config.api_key.clone());

        Self::with_clients(cache, nps_client, places_client).await
    }

    /// Creates an App with custom clients, building the state index
    pub async fn with_clients(
        mut cache: CacheStore,
        nps_client: NpsClient,
        places_client: PlacesClient,
    ) -> Result<Self, AppError> {
        let state_index = nps_client.state_index(&mut cache).await?;
        tracing::debug!(states = state_index.len(), "state index ready");

        Ok(Self {
            state: AppState::StateSelection,
            state_index,
            cache,
            nps_client,
            places_client,
        })
    }

    /// States this session can list
    pub fn state_index(&self) -> &StateIndex {
        &self.state_index
    }

    /// The response cache
    pub fn cache(&self) -> &CacheStore {
        &self.cache
    }

    /// Whether the session has ended
    pub fn should_quit(&self) -> bool {
        self.state == AppState::Exited
    }

    /// Prompt for the current state
    pub fn prompt(&self) -> &'static str {
        match self.state {
            AppState::StateSelection | AppState::Exited => STATE_PROMPT,
            AppState::SiteListing(_) | AppState::PlaceDetail(..) => SITE_PROMPT,
        }
    }

    /// Runs the prompt loop until `exit` or end of input
    pub async fn run<R: BufRead, W: Write>(
        &mut self,
        mut input: R,
        mut output: W,
    ) -> Result<(), AppError> {
        let mut line = String::new();
        while !self.should_quit() {
            write!(output, "{}", self.prompt())?;
            output.flush()?;

            line.clear();
            if input.read_line(&mut line)? == 0 {
                writeln!(output)?;
                self.state = AppState::Exited;
                break;
            }
            self.handle_line(&line, &mut output).await?;
        }
        Ok(())
    }

    /// Processes one line of input in the current state
    pub async fn handle_line<W: Write>(&mut self, line: &str, output: &mut W) -> Result<(), AppError> {
        let command = parse_command(line);
        if command == Command::Exit {
            writeln!(output, "Goodbye!")?;
            self.state = AppState::Exited;
            return Ok(());
        }

        let current = std::mem::replace(&mut self.state, AppState::Exited);
        self.state = match current {
            AppState::StateSelection => self.select_state(line.trim(), output).await?,
            AppState::SiteListing(listing) => self.select_site(listing, None, command, output).await?,
            AppState::PlaceDetail(listing, shown) => {
                self.select_site(listing, Some(shown), command, output).await?
            }
            AppState::Exited => AppState::Exited,
        };
        Ok(())
    }

    /// Lists the sites of the named state, or reports an unknown name
    async fn select_state<W: Write>(&mut self, name: &str, output: &mut W) -> Result<AppState, AppError> {
        let Some(state_url) = self.state_index.lookup(name).map(str::to_string) else {
            writeln!(output, "[Error] Enter proper state name")?;
            writeln!(output)?;
            return Ok(AppState::StateSelection);
        };

        let sites = self
            .nps_client
            .sites_for_state(&state_url, &mut self.cache)
            .await?;
        let listing = Listing {
            state: name.to_string(),
            sites,
        };
        write_listing(&listing, output)?;

        Ok(AppState::SiteListing(listing))
    }

    /// Shows places near the chosen site, or reports invalid input
    ///
    /// `shown` is the site whose places are currently displayed, so invalid
    /// input leaves the state exactly as it was.
    async fn select_site<W: Write>(
        &mut self,
        listing: Listing,
        shown: Option<usize>,
        command: Command,
        output: &mut W,
    ) -> Result<AppState, AppError> {
        match command {
            Command::Back => Ok(AppState::StateSelection),
            Command::Number(n) if (1..=listing.sites.len()).contains(&n) => {
                let index = n - 1;
                let site = &listing.sites[index];
                let places = self
                    .places_client
                    .nearby_places(&site.postal_code, &mut self.cache)
                    .await?;
                write_places(site, &places, output)?;
                Ok(AppState::PlaceDetail(listing, index))
            }
            _ => {
                writeln!(output, "[Error] Invalid input")?;
                writeln!(output, "-------------------------------")?;
                writeln!(output)?;
                Ok(match shown {
                    Some(index) => AppState::PlaceDetail(listing, index),
                    None => AppState::SiteListing(listing),
                })
            }
        }
    }
}

fn write_listing<W: Write>(listing: &Listing, output: &mut W) -> std::io::Result<()> {
    writeln!(output, "---------------------------------")?;
    writeln!(output, "List of national sites in {}", listing.state)?;
    writeln!(output, "---------------------------------")?;
    if listing.sites.is_empty() {
        writeln!(output, "(no sites listed)")?;
    }
    for (i, site) in listing.sites.iter().enumerate() {
        writeln!(output, "[{}] {}", i + 1, site.info())?;
    }
    writeln!(output)
}

fn write_places<W: Write>(site: &Site, places: &[NearbyPlace], output: &mut W) -> std::io::Result<()> {
    writeln!(output, "--------------------------------")?;
    writeln!(output, "Places near {}", site.name)?;
    writeln!(output, "--------------------------------")?;
    if places.is_empty() {
        writeln!(output, "(no places found)")?;
    }
    for place in places {
        writeln!(output, "{}", place.summary())?;
    }
    writeln!(output)
}

use crate::error::AppError;
use crate::models::{DataSource, Game};
use crate::retriever::FetchChain;
use crate::surface::{DisplaySurface, View};

pub const ALL: &str = "all";
pub const LOADING_TEXT: &str = "Loading games...";
pub const LOAD_FAILED_TEXT: &str = "Failed to load games. Please try again later.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSelection {
    pub platform: String,
    pub category: String,
}

impl Default for FilterSelection {
    fn default() -> Self {
        Self {
            platform: ALL.to_string(),
            category: ALL.to_string(),
        }
    }
}

impl FilterSelection {
    pub fn new(platform: Option<&str>, category: Option<&str>) -> Self {
        Self {
            platform: platform.unwrap_or(ALL).to_string(),
            category: category.unwrap_or(ALL).to_string(),
        }
    }

    pub fn matches(&self, game: &Game) -> bool {
        let platform_ok = self.platform == ALL || game.platform.contains(self.platform.as_str());
        let category_ok = self.category == ALL || game.genre == self.category;
        platform_ok && category_ok
    }
}

/// Games passing `selection`, in dataset order.
pub fn filter_games<'a>(games: &'a [Game], selection: &FilterSelection) -> Vec<&'a Game> {
    games.iter().filter(|g| selection.matches(g)).collect()
}

/// Distinct genres in first-seen order.
pub fn distinct_genres(games: &[Game]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for game in games {
        if !out.iter().any(|g| *g == game.genre) {
            out.push(game.genre.clone());
        }
    }
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Loading,
    Ready,
    EmptyError,
}

pub struct Controller {
    phase: Phase,
    games: Vec<Game>,
    categories: Vec<String>,
    selection: FilterSelection,
}

impl Controller {
    pub fn new(surface: &mut impl DisplaySurface) -> Result<Self, AppError> {
        Self::with_selection(FilterSelection::default(), surface)
    }

    /// Starts loading with `selection` already applied to the first render.
    pub fn with_selection(
        selection: FilterSelection,
        surface: &mut impl DisplaySurface,
    ) -> Result<Self, AppError> {
        surface.show_loading(LOADING_TEXT)?;
        Ok(Self {
            phase: Phase::Loading,
            games: Vec::new(),
            categories: Vec::new(),
            selection,
        })
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn games(&self) -> &[Game] {
        &self.games
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn selection(&self) -> &FilterSelection {
        &self.selection
    }

    pub fn view(&self) -> Vec<&Game> {
        filter_games(&self.games, &self.selection)
    }

    pub fn finish_load(
        &mut self,
        games: Vec<Game>,
        surface: &mut impl DisplaySurface,
    ) -> Result<Phase, AppError> {
        if self.phase != Phase::Loading {
            return Err(AppError::Internal("catalog already loaded".to_string()));
        }

        if games.is_empty() {
            self.phase = Phase::EmptyError;
            surface.show_loading(LOAD_FAILED_TEXT)?;
            return Ok(self.phase);
        }

        self.games = games;
        self.categories = distinct_genres(&self.games);
        self.phase = Phase::Ready;

        surface.hide_loading()?;
        for genre in &self.categories {
            surface.append_category_option(genre)?;
        }
        self.render(surface)?;
        Ok(self.phase)
    }

    /// Re-renders for a new selection. Ignored unless the catalog is ready.
    pub fn on_filter_change(
        &mut self,
        selection: FilterSelection,
        surface: &mut impl DisplaySurface,
    ) -> Result<bool, AppError> {
        if self.phase != Phase::Ready {
            return Ok(false);
        }
        self.selection = selection;
        self.render(surface)?;
        Ok(true)
    }

    pub fn open(&self, id: i64, surface: &mut impl DisplaySurface) -> Result<(), AppError> {
        let game = self
            .games
            .iter()
            .find(|g| g.id == id)
            .ok_or_else(|| AppError::InvalidArgument(format!("no game with id {id}")))?;
        surface.open_link(&game.game_url)
    }

    fn render(&self, surface: &mut impl DisplaySurface) -> Result<(), AppError> {
        let view = self.view();
        if view.is_empty() {
            surface.render(View::NoMatches)
        } else {
            surface.render(View::Cards(&view))
        }
    }
}

/// Retrieves the catalog and renders it once under `selection`.
///
/// An empty retrieval leaves the failure message on the surface and is
/// reported as `Unavailable`.
pub async fn load_catalog(
    chain: &FetchChain,
    surface: &mut impl DisplaySurface,
    selection: FilterSelection,
) -> Result<(Controller, DataSource), AppError> {
    let mut controller = Controller::with_selection(selection, surface)?;
    let retrieval = chain.retrieve_with_source().await;

    if controller.finish_load(retrieval.games, surface)? == Phase::EmptyError {
        return Err(AppError::Unavailable(
            "every retrieval strategy failed".to_string(),
        ));
    }

    let source = retrieval.source.unwrap_or(DataSource::Internal);
    Ok((controller, source))
}

use std::fmt::Write as _;
use std::io::Write;

use crate::catalog::{ALL, FilterSelection};
use crate::error::AppError;
use crate::models::Game;

pub const NO_MATCHES_TEXT: &str = "No games match your filters";

/// Values offered by the platform control; matched as substrings.
pub const PLATFORM_OPTIONS: [(&str, &str); 3] = [
    (ALL, "All Platforms"),
    ("PC", "PC (Windows)"),
    ("Browser", "Web Browser"),
];

pub enum View<'a> {
    Cards(&'a [&'a Game]),
    NoMatches,
}

/// Where the catalog gets drawn.
pub trait DisplaySurface {
    fn show_loading(&mut self, text: &str) -> Result<(), AppError>;
    fn hide_loading(&mut self) -> Result<(), AppError>;
    fn append_category_option(&mut self, genre: &str) -> Result<(), AppError>;
    /// Replaces whatever the container showed before.
    fn render(&mut self, view: View<'_>) -> Result<(), AppError>;
    fn open_link(&mut self, url: &str) -> Result<(), AppError>;
}

pub struct TerminalSurface<W: Write> {
    out: W,
    pending_options: Vec<String>,
}

impl<W: Write> TerminalSurface<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            pending_options: Vec::new(),
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> DisplaySurface for TerminalSurface<W> {
    fn show_loading(&mut self, text: &str) -> Result<(), AppError> {
        writeln!(self.out, "{text}")?;
        Ok(())
    }

    fn hide_loading(&mut self) -> Result<(), AppError> {
        Ok(())
    }

    fn append_category_option(&mut self, genre: &str) -> Result<(), AppError> {
        self.pending_options.push(genre.to_string());
        Ok(())
    }

    fn render(&mut self, view: View<'_>) -> Result<(), AppError> {
        if !self.pending_options.is_empty() {
            writeln!(self.out, "categories: {}", self.pending_options.join(", "))?;
            self.pending_options.clear();
        }

        match view {
            View::NoMatches => writeln!(self.out, "{NO_MATCHES_TEXT}")?,
            View::Cards(games) => {
                writeln!(self.out, "games ({})", games.len())?;
                for game in games {
                    writeln!(self.out, "[{}] {}", game.id, game.title)?;
                    writeln!(self.out, "    {} | {}", game.genre, game.platform)?;
                    writeln!(self.out, "    {}", game.short_description.trim())?;
                    writeln!(self.out, "    {}", game.thumbnail)?;
                    writeln!(self.out, "    {}", game.game_url)?;
                }
            }
        }
        self.out.flush()?;
        Ok(())
    }

    fn open_link(&mut self, url: &str) -> Result<(), AppError> {
        writeln!(self.out, "open {url}")?;
        self.out.flush()?;
        Ok(())
    }
}

/// Renders the catalog page as a standalone HTML document.
#[derive(Debug, Default)]
pub struct HtmlSurface {
    loading: Option<String>,
    categories: Vec<String>,
    container: String,
}

impl HtmlSurface {
    /// The page as it stands, with `selection` marked in both controls.
    pub fn document(&self, selection: &FilterSelection) -> String {
        let mut html = String::new();
        html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
        html.push_str("<meta charset=\"utf-8\">\n<title>Free-to-Play Games</title>\n");
        html.push_str("</head>\n<body>\n");

        html.push_str("<div class=\"filters\">\n<select id=\"platformFilter\">\n");
        for (value, label) in PLATFORM_OPTIONS {
            push_option(&mut html, value, label, selection.platform == value);
        }
        html.push_str("</select>\n<select id=\"categoryFilter\">\n");
        push_option(&mut html, ALL, "All Categories", selection.category == ALL);
        for genre in &self.categories {
            push_option(&mut html, genre, genre, selection.category == *genre);
        }
        html.push_str("</select>\n</div>\n");

        match &self.loading {
            Some(text) => {
                let _ = writeln!(html, "<div class=\"loading\">{}</div>", escape_html(text));
            }
            None => html.push_str("<div class=\"loading\" style=\"display: none\"></div>\n"),
        }

        let _ = writeln!(html, "<div class=\"games-container\">{}</div>", self.container);
        html.push_str("</body>\n</html>\n");
        html
    }
}

fn push_option(html: &mut String, value: &str, label: &str, selected: bool) {
    let _ = writeln!(
        html,
        "<option value=\"{}\"{}>{}</option>",
        escape_html(value),
        if selected { " selected" } else { "" },
        escape_html(label)
    );
}

fn card_html(game: &Game) -> String {
    format!(
        concat!(
            "<a class=\"game-card\" href=\"{url}\" target=\"_blank\" rel=\"noopener\">",
            "<img src=\"{thumb}\" alt=\"{title}\" class=\"game-image\">",
            "<div class=\"game-details\">",
            "<h3 class=\"game-title\">{title}</h3>",
            "<p class=\"game-description\">{desc}</p>",
            "<div class=\"game-meta\">",
            "<span class=\"game-platform\">{platform}</span>",
            "<span class=\"game-genre\">{genre}</span>",
            "</div></div></a>"
        ),
        url = escape_html(&game.game_url),
        thumb = escape_html(&game.thumbnail),
        title = escape_html(&game.title),
        desc = escape_html(&game.short_description),
        platform = escape_html(&game.platform),
        genre = escape_html(&game.genre),
    )
}

pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

impl DisplaySurface for HtmlSurface {
    fn show_loading(&mut self, text: &str) -> Result<(), AppError> {
        self.loading = Some(text.to_string());
        Ok(())
    }

    fn hide_loading(&mut self) -> Result<(), AppError> {
        self.loading = None;
        Ok(())
    }

    fn append_category_option(&mut self, genre: &str) -> Result<(), AppError> {
        self.categories.push(genre.to_string());
        Ok(())
    }

    fn render(&mut self, view: View<'_>) -> Result<(), AppError> {
        self.container = match view {
            View::NoMatches => format!("<p class=\"no-games\">{NO_MATCHES_TEXT}</p>"),
            View::Cards(games) => games.iter().map(|g| card_html(g)).collect(),
        };
        Ok(())
    }

    /// Cards are anchors with `target="_blank"`; the page opens them itself.
    fn open_link(&mut self, _url: &str) -> Result<(), AppError> {
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceEvent {
    Loading(String),
    LoadingHidden,
    CategoryOption(String),
    Cards(Vec<i64>),
    NoMatches,
    Opened(String),
}

/// Keeps a log of every call instead of drawing anything.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub events: Vec<SurfaceEvent>,
}

impl DisplaySurface for RecordingSurface {
    fn show_loading(&mut self, text: &str) -> Result<(), AppError> {
        self.events.push(SurfaceEvent::Loading(text.to_string()));
        Ok(())
    }

    fn hide_loading(&mut self) -> Result<(), AppError> {
        self.events.push(SurfaceEvent::LoadingHidden);
        Ok(())
    }

    fn append_category_option(&mut self, genre: &str) -> Result<(), AppError> {
        self.events.push(SurfaceEvent::CategoryOption(genre.to_string()));
        Ok(())
    }

    fn render(&mut self, view: View<'_>) -> Result<(), AppError> {
        let event = match view {
            View::NoMatches => SurfaceEvent::NoMatches,
            View::Cards(games) => SurfaceEvent::Cards(games.iter().map(|g| g.id).collect()),
        };
        self.events.push(event);
        Ok(())
    }

    fn open_link(&mut self, url: &str) -> Result<(), AppError> {
        self.events.push(SurfaceEvent::Opened(url.to_string()));
        Ok(())
    }
}

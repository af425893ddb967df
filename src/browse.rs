use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::catalog::Controller;
use crate::error::AppError;
use crate::surface::DisplaySurface;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowseCommand {
    Platform(String),
    Category(String),
    Open(i64),
    Quit,
}

pub const HELP: &str = "commands: platform <value|all>, category <value|all>, open <id>, quit";

/// Parses one input line. Blank lines yield `None`.
pub fn parse_command(line: &str) -> Result<Option<BrowseCommand>, AppError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };

    let command = match verb {
        "platform" | "category" if rest.is_empty() => {
            return Err(AppError::InvalidArgument(format!("{verb} needs a value")));
        }
        "platform" => BrowseCommand::Platform(rest.to_string()),
        "category" => BrowseCommand::Category(rest.to_string()),
        "open" => {
            let id = rest
                .parse::<i64>()
                .map_err(|_| AppError::InvalidArgument(format!("invalid game id '{rest}'")))?;
            BrowseCommand::Open(id)
        }
        "quit" | "exit" => BrowseCommand::Quit,
        other => {
            return Err(AppError::InvalidArgument(format!(
                "unknown command '{other}' ({HELP})"
            )));
        }
    };
    Ok(Some(command))
}

/// Applies filter changes read line by line until `quit` or end of input.
pub async fn run<R, S>(
    controller: &mut Controller,
    surface: &mut S,
    input: R,
) -> Result<(), AppError>
where
    R: AsyncBufRead + Unpin,
    S: DisplaySurface,
{
    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await? {
        let command = match parse_command(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(err) => {
                eprintln!("Error [{}]: {}", err.code(), err);
                continue;
            }
        };

        let mut selection = controller.selection().clone();
        match command {
            BrowseCommand::Quit => break,
            BrowseCommand::Open(id) => {
                if let Err(err) = controller.open(id, surface) {
                    eprintln!("Error [{}]: {}", err.code(), err);
                }
                continue;
            }
            BrowseCommand::Platform(value) => selection.platform = value,
            BrowseCommand::Category(value) => selection.category = value,
        }
        tracing::debug!(platform = %selection.platform, category = %selection.category, "filter changed");
        controller.on_filter_change(selection, surface)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::FilterSelection;
    use crate::sample::sample_games;
    use crate::surface::{RecordingSurface, SurfaceEvent};

    #[test]
    fn parses_verbs() {
        assert_eq!(
            parse_command("platform Web Browser").unwrap(),
            Some(BrowseCommand::Platform("Web Browser".to_string()))
        );
        assert_eq!(
            parse_command("  category   Shooter ").unwrap(),
            Some(BrowseCommand::Category("Shooter".to_string()))
        );
        assert_eq!(parse_command("open 7").unwrap(), Some(BrowseCommand::Open(7)));
        assert_eq!(parse_command("quit").unwrap(), Some(BrowseCommand::Quit));
        assert_eq!(parse_command("   ").unwrap(), None);
        assert!(parse_command("open seven").is_err());
        assert!(parse_command("category").is_err());
        assert!(parse_command("dance").is_err());
    }

    #[tokio::test]
    async fn each_change_keeps_the_other_selector() {
        let mut surface = RecordingSurface::default();
        let mut controller = Controller::new(&mut surface).unwrap();
        controller.finish_load(sample_games(), &mut surface).unwrap();
        let rendered_before = surface.events.len();

        let input: &[u8] = b"category MMORPG\nbogus\nplatform Mac\nplatform PC\nopen 1\nquit\ncategory Shooter\n";
        run(&mut controller, &mut surface, input).await.unwrap();

        assert_eq!(
            surface.events[rendered_before..].to_vec(),
            vec![
                SurfaceEvent::Cards(vec![1, 8]),
                SurfaceEvent::NoMatches,
                SurfaceEvent::Cards(vec![1, 8]),
                SurfaceEvent::Opened("https://www.freetogame.com/open/dauntless".to_string()),
            ]
        );
        assert_eq!(
            controller.selection(),
            &FilterSelection::new(Some("PC"), Some("MMORPG"))
        );
    }
}

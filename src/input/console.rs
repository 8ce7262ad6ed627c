//! Line commands for the headless client
//!
//! Each line stands in for one browser interaction and becomes one or more
//! [`InputEvent`]s; the input layer then handles them exactly as it would
//! handle pointer, keyboard, or clipboard events.

use std::path::PathBuf;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;

use super::{ClipboardItem, DropItem, InputEvent, Key};
use crate::gallery::ViewKind;

pub const HELP: &str = "\
commands:
  add <url>               add an image by URL
  upload <path>...        add image files
  drop <url|path>         drop a link or a file onto the gallery
  paste <path>            paste an image file's bytes
  open <n>                open photo n in the modal
  close                   close the modal
  next | prev             modal navigation buttons
  key left|right|esc      keyboard while the modal is open
  swipe <from-x> <to-x>   horizontal touch gesture on the modal
  move <from> <to>        drag a card to a new position
  view gallery|deleted    switch between gallery and recently deleted
  delete                  delete the photo in the modal
  download                save the photo in the modal
  help | quit";

#[derive(Debug, Clone, PartialEq)]
pub enum ConsoleAction {
    Input(Vec<InputEvent>),
    Help,
    Quit,
}

/// Parse one console line; `Ok(None)` for blank lines
pub async fn parse_line(line: &str) -> Result<Option<ConsoleAction>, String> {
    let mut words = line.split_whitespace();
    let Some(command) = words.next() else {
        return Ok(None);
    };
    let args: Vec<&str> = words.collect();

    let events = match (command, args.as_slice()) {
        ("help" | "?", _) => return Ok(Some(ConsoleAction::Help)),
        ("quit" | "exit", _) => return Ok(Some(ConsoleAction::Quit)),
        ("add", [url]) => vec![InputEvent::UrlSubmitted(url.to_string())],
        ("upload", paths) if !paths.is_empty() => {
            vec![InputEvent::FilesChosen(paths.iter().map(PathBuf::from).collect())]
        }
        ("drop", [target]) => {
            let item = if target.starts_with("http://") || target.starts_with("https://") {
                DropItem::Text(target.to_string())
            } else {
                DropItem::File {
                    path: PathBuf::from(target),
                    mime: None,
                }
            };
            vec![InputEvent::Dropped(vec![item])]
        }
        ("paste", [path]) => {
            let data = tokio::fs::read(path)
                .await
                .map_err(|e| format!("cannot read {}: {}", path, e))?;
            let mime = mime_guess::from_path(path).first_or_octet_stream().to_string();
            vec![InputEvent::Pasted(vec![ClipboardItem { mime, data }])]
        }
        ("open", [n]) => vec![InputEvent::CardClicked(parse_index(n)?)],
        ("close", []) => vec![InputEvent::ModalClose],
        ("next", []) => vec![InputEvent::ModalNext],
        ("prev", []) => vec![InputEvent::ModalPrev],
        ("key", [name]) => vec![InputEvent::Key(parse_key(name))],
        ("swipe", [from, to]) => vec![
            InputEvent::TouchStart {
                x: parse_coordinate(from)?,
            },
            InputEvent::TouchMove {
                x: parse_coordinate(to)?,
            },
            InputEvent::TouchEnd,
        ],
        ("move", [from, to]) => vec![InputEvent::CardDragged {
            from: parse_index(from)?,
            to: parse_index(to)?,
        }],
        ("view", [name]) => {
            let view = ViewKind::parse(name).ok_or_else(|| format!("unknown view '{}'", name))?;
            vec![InputEvent::SwitchView(view)]
        }
        ("delete", []) => vec![InputEvent::DeleteCurrent],
        ("download", []) => vec![InputEvent::DownloadCurrent],
        _ => return Err(format!("unrecognized command '{}' (try 'help')", line.trim())),
    };
    Ok(Some(ConsoleAction::Input(events)))
}

/// Feed console lines into `events` until quit or end of input
///
/// Help and parse errors are printed directly; everything else goes through
/// the event channel. Returning drops `events`, which ends the client loop.
pub async fn read_commands<R>(reader: R, events: mpsc::Sender<InputEvent>)
where
    R: AsyncBufRead + Unpin,
{
    println!("{}", HELP);
    let mut lines = reader.lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                tracing::warn!("Console read failed: {}", e);
                break;
            }
        };
        match parse_line(&line).await {
            Ok(None) => {}
            Ok(Some(ConsoleAction::Help)) => println!("{}", HELP),
            Ok(Some(ConsoleAction::Quit)) => break,
            Ok(Some(ConsoleAction::Input(batch))) => {
                for event in batch {
                    if events.send(event).await.is_err() {
                        return;
                    }
                }
            }
            Err(message) => println!("! {}", message),
        }
    }
    tracing::debug!("Console input finished");
}

fn parse_index(s: &str) -> Result<usize, String> {
    s.parse().map_err(|_| format!("'{}' is not a photo index", s))
}

fn parse_coordinate(s: &str) -> Result<f64, String> {
    s.parse().map_err(|_| format!("'{}' is not a coordinate", s))
}

fn parse_key(name: &str) -> Key {
    match name.to_ascii_lowercase().as_str() {
        "left" | "arrowleft" => Key::ArrowLeft,
        "right" | "arrowright" => Key::ArrowRight,
        "esc" | "escape" => Key::Escape,
        _ => Key::Other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn events(line: &str) -> Vec<InputEvent> {
        match parse_line(line).await.unwrap() {
            Some(ConsoleAction::Input(events)) => events,
            other => panic!("Expected input events, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_blank_and_control_lines() {
        assert_eq!(parse_line("   ").await.unwrap(), None);
        assert_eq!(parse_line("help").await.unwrap(), Some(ConsoleAction::Help));
        assert_eq!(parse_line("quit").await.unwrap(), Some(ConsoleAction::Quit));
    }

    #[tokio::test]
    async fn test_swipe_expands_to_gesture() {
        assert_eq!(
            events("swipe 300 100").await,
            vec![
                InputEvent::TouchStart { x: 300.0 },
                InputEvent::TouchMove { x: 100.0 },
                InputEvent::TouchEnd,
            ]
        );
    }

    #[tokio::test]
    async fn test_drop_distinguishes_links_and_files() {
        assert_eq!(
            events("drop https://example.com/a.png").await,
            vec![InputEvent::Dropped(vec![DropItem::Text(
                "https://example.com/a.png".into()
            )])]
        );
        assert_eq!(
            events("drop ./a.png").await,
            vec![InputEvent::Dropped(vec![DropItem::File {
                path: PathBuf::from("./a.png"),
                mime: None,
            }])]
        );
    }

    #[tokio::test]
    async fn test_paste_reads_file_bytes() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("clip.png");
        std::fs::write(&path, [0x89, b'P', b'N', b'G']).unwrap();

        let line = format!("paste {}", path.display());
        assert_eq!(
            events(&line).await,
            vec![InputEvent::Pasted(vec![ClipboardItem {
                mime: "image/png".into(),
                data: vec![0x89, b'P', b'N', b'G'],
            }])]
        );
    }

    #[tokio::test]
    async fn test_bad_arguments_are_errors() {
        assert!(parse_line("open first").await.is_err());
        assert!(parse_line("view attic").await.is_err());
        assert!(parse_line("frobnicate").await.is_err());
        assert!(parse_line("paste /definitely/not/here.png").await.is_err());
    }

    #[tokio::test]
    async fn test_read_commands_stops_at_quit() {
        let (tx, mut rx) = mpsc::channel(16);
        let script: &[u8] = b"open 1\nbogus\n\nnext\nquit\nclose\n";
        read_commands(script, tx).await;

        let mut received = Vec::new();
        while let Some(event) = rx.recv().await {
            received.push(event);
        }
        assert_eq!(
            received,
            vec![InputEvent::CardClicked(1), InputEvent::ModalNext]
        );
    }

    #[tokio::test]
    async fn test_move_and_keys() {
        assert_eq!(
            events("move 2 0").await,
            vec![InputEvent::CardDragged { from: 2, to: 0 }]
        );
        assert_eq!(events("key Left").await, vec![InputEvent::Key(Key::ArrowLeft)]);
        assert_eq!(
            events("view deleted").await,
            vec![InputEvent::SwitchView(ViewKind::Deleted)]
        );
    }
}

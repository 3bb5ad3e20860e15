//! Slateboard replay shell.
//!
//! Runs a recorded script of [`InputEvent`]s through the headless editor and
//! writes the resulting board. Used to reproduce reported editing sessions
//! and to apply scripted edits to saved boards.

use slateboard_core::storage::{FileStorage, Storage, StorageError};
use slateboard_core::{
    ApproximateMetrics, DocumentError, Editor, EditorError, EditorSettings, Effect, InputEvent,
};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Id under which the result of every stored replay is also kept.
pub const LAST_DOCUMENT_ID: &str = "__last__";

pub const USAGE: &str = "\
usage: slateboard <script.json> [options]

options:
  --document <file>   start from an exported board instead of an empty one
  --settings <file>   editor settings as JSON
  --out <file>        write the resulting board here
  --store <dir>       storage directory (defaults to the user data directory)
  --load <id>         start from a stored board
  --save-as <id>      store the resulting board under this id";

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Usage(String),
    #[error("Could not read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Could not write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid event script: {0}")]
    Script(#[source] serde_json::Error),
    #[error("Invalid settings: {0}")]
    Settings(#[source] serde_json::Error),
    #[error(transparent)]
    Document(#[from] DocumentError),
    #[error(transparent)]
    Editor(#[from] EditorError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Replay configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppConfig {
    pub script: PathBuf,
    pub document: Option<PathBuf>,
    pub settings: Option<PathBuf>,
    pub out: Option<PathBuf>,
    pub store: Option<PathBuf>,
    pub load: Option<String>,
    pub save_as: Option<String>,
}

impl AppConfig {
    /// Parse command line arguments, program name excluded.
    pub fn from_args<I>(args: I) -> Result<Self, AppError>
    where
        I: IntoIterator<Item = String>,
    {
        let mut config = Self::default();
        let mut script = None;
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--document" => config.document = Some(value(&mut args, &arg)?.into()),
                "--settings" => config.settings = Some(value(&mut args, &arg)?.into()),
                "--out" => config.out = Some(value(&mut args, &arg)?.into()),
                "--store" => config.store = Some(value(&mut args, &arg)?.into()),
                "--load" => config.load = Some(value(&mut args, &arg)?),
                "--save-as" => config.save_as = Some(value(&mut args, &arg)?),
                flag if flag.starts_with("--") => {
                    return Err(AppError::Usage(format!("Unknown option {flag}")));
                }
                _ if script.is_none() => script = Some(PathBuf::from(&arg)),
                _ => return Err(AppError::Usage(format!("Unexpected argument {arg}"))),
            }
        }

        config.script = script.ok_or_else(|| AppError::Usage("Missing event script".into()))?;
        if config.document.is_some() && config.load.is_some() {
            return Err(AppError::Usage(
                "--document and --load cannot be combined".into(),
            ));
        }
        Ok(config)
    }

    fn uses_storage(&self) -> bool {
        self.store.is_some() || self.load.is_some() || self.save_as.is_some()
    }
}

fn value(args: &mut impl Iterator<Item = String>, flag: &str) -> Result<String, AppError> {
    args.next()
        .ok_or_else(|| AppError::Usage(format!("{flag} needs a value")))
}

fn read(path: &Path) -> Result<String, AppError> {
    fs::read_to_string(path).map_err(|source| AppError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Run a replay and return the editor in its final state.
pub fn run(config: &AppConfig) -> Result<Editor, AppError> {
    let storage = if !config.uses_storage() {
        None
    } else if let Some(dir) = &config.store {
        Some(FileStorage::new(dir.clone())?)
    } else {
        Some(FileStorage::default_location()?)
    };

    let mut editor = open_editor(config, storage.as_ref())?;
    if let Some(path) = &config.settings {
        editor.settings = EditorSettings::from_json(&read(path)?).map_err(AppError::Settings)?;
    }

    let events: Vec<InputEvent> =
        serde_json::from_str(&read(&config.script)?).map_err(AppError::Script)?;
    log::info!("Replaying {} event(s) from {}", events.len(), config.script.display());
    let effects = replay(&mut editor, events);
    log::info!(
        "Replay produced {effects} effect(s); {} element(s) on the current page",
        editor.page().elements.len()
    );

    if let Some(out) = &config.out {
        fs::write(out, editor.to_json()?).map_err(|source| AppError::Write {
            path: out.clone(),
            source,
        })?;
        log::info!("Wrote {}", out.display());
    }

    if let (Some(storage), Some(id)) = (&storage, &config.save_as) {
        pollster::block_on(storage.save(id, editor.document(), &editor.settings))?;
        pollster::block_on(storage.save(LAST_DOCUMENT_ID, editor.document(), &editor.settings))?;
        log::info!("Saved board as {id}");
    }

    Ok(editor)
}

fn open_editor(config: &AppConfig, storage: Option<&FileStorage>) -> Result<Editor, AppError> {
    if let Some(path) = &config.document {
        let mut editor = Editor::new();
        editor.load_json(&read(path)?)?;
        log::info!("Opened {}", path.display());
        return Ok(editor);
    }
    if let (Some(storage), Some(id)) = (storage, &config.load) {
        let (document, settings) = pollster::block_on(storage.load(id))?;
        log::info!("Loaded stored board {id}");
        return Ok(Editor::with_document(document, settings));
    }
    Ok(Editor::new())
}

/// Feed `events` to the editor in order. Returns the number of effects the
/// host would have been asked to carry out.
pub fn replay(editor: &mut Editor, events: impl IntoIterator<Item = InputEvent>) -> usize {
    let metrics = ApproximateMetrics;
    let mut count = 0;
    for (index, event) in events.into_iter().enumerate() {
        log::trace!("#{index}: {event:?}");
        for effect in editor.handle_event(event, &metrics) {
            log_effect(index, &effect);
            count += 1;
        }
    }
    count
}

fn log_effect(index: usize, effect: &Effect) {
    match effect {
        Effect::PasteRejected { reason } => log::warn!("#{index}: paste rejected: {reason}"),
        Effect::DocumentChanged => log::debug!("#{index}: document changed"),
        other => log::trace!("#{index}: {other:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Point;
    use slateboard_core::{ElementType, Key, Modifiers, Tool};

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn rectangle_script() -> Vec<InputEvent> {
        let at = |x, y| Point::new(x, y);
        vec![
            InputEvent::SetTool {
                tool: Tool::Rectangle,
            },
            InputEvent::PointerDown {
                client: at(10.0, 10.0),
                modifiers: Modifiers::NONE,
            },
            InputEvent::PointerMove {
                client: at(80.0, 50.0),
                modifiers: Modifiers::NONE,
            },
            InputEvent::PointerUp {
                client: at(120.0, 90.0),
                modifiers: Modifiers::NONE,
            },
        ]
    }

    fn write_script(dir: &Path, events: &[InputEvent]) -> PathBuf {
        let path = dir.join("script.json");
        fs::write(&path, serde_json::to_string(events).unwrap()).unwrap();
        path
    }

    #[test]
    fn test_parse_args() {
        let config = AppConfig::from_args(args(&[
            "run.json",
            "--out",
            "board.json",
            "--save-as",
            "demo",
        ]))
        .unwrap();
        assert_eq!(config.script, PathBuf::from("run.json"));
        assert_eq!(config.out, Some(PathBuf::from("board.json")));
        assert_eq!(config.save_as.as_deref(), Some("demo"));
        assert!(config.uses_storage());
    }

    #[test]
    fn test_parse_args_errors() {
        assert!(matches!(
            AppConfig::from_args(args(&[])),
            Err(AppError::Usage(_))
        ));
        assert!(matches!(
            AppConfig::from_args(args(&["run.json", "--verbose"])),
            Err(AppError::Usage(_))
        ));
        assert!(matches!(
            AppConfig::from_args(args(&["run.json", "--out"])),
            Err(AppError::Usage(_))
        ));
        assert!(matches!(
            AppConfig::from_args(args(&["a.json", "--document", "b.json", "--load", "x"])),
            Err(AppError::Usage(_))
        ));
    }

    #[test]
    fn test_replay_counts_effects() {
        let mut editor = Editor::new();
        let effects = replay(&mut editor, rectangle_script());
        assert!(effects > 0);
        assert_eq!(editor.page().elements.len(), 1);
        assert_eq!(editor.tool(), Tool::Select);
    }

    #[test]
    fn test_run_writes_output() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("board.json");
        let config = AppConfig {
            script: write_script(dir.path(), &rectangle_script()),
            out: Some(out.clone()),
            ..AppConfig::default()
        };

        run(&config).unwrap();

        let mut reopened = Editor::new();
        reopened.load_json(&fs::read_to_string(&out).unwrap()).unwrap();
        let element = reopened.page().elements.iter().next().unwrap();
        assert_eq!(element.element_type(), ElementType::Rectangle);
    }

    #[test]
    fn test_run_continues_stored_board() {
        let dir = tempfile::tempdir().unwrap();
        let store = dir.path().join("store");
        let first = AppConfig {
            script: write_script(dir.path(), &rectangle_script()),
            store: Some(store.clone()),
            save_as: Some("demo".into()),
            ..AppConfig::default()
        };
        run(&first).unwrap();

        let undo = [InputEvent::KeyDown {
            key: Key::Char('z'),
            modifiers: Modifiers {
                ctrl: true,
                ..Modifiers::NONE
            },
        }];
        let second = AppConfig {
            script: write_script(dir.path(), &undo),
            store: Some(store.clone()),
            load: Some("demo".into()),
            ..AppConfig::default()
        };
        let editor = run(&second).unwrap();
        // history is not persisted, so there is nothing to undo
        assert_eq!(editor.page().elements.len(), 1);

        let storage = FileStorage::new(store).unwrap();
        assert!(pollster::block_on(storage.exists(LAST_DOCUMENT_ID)).unwrap());
    }

    #[test]
    fn test_run_rejects_bad_script() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("script.json");
        fs::write(&script, "{\"event\": \"pointerDown\"}").unwrap();
        let config = AppConfig {
            script,
            ..AppConfig::default()
        };
        assert!(matches!(run(&config), Err(AppError::Script(_))));
    }

    #[test]
    fn test_missing_stored_board() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig {
            script: write_script(dir.path(), &[]),
            store: Some(dir.path().join("store")),
            load: Some("nope".into()),
            ..AppConfig::default()
        };
        assert!(matches!(
            run(&config),
            Err(AppError::Storage(StorageError::NotFound(_)))
        ));
    }
}

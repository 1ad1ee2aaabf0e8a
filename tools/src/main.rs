//! save-runner: headless driver for the base planner save core.
//!
//! Usage:
//!   save-runner --db saves.db
//!   save-runner --db saves.db --data-dir ./data --export-dir ./exports --ipc-mode
//!   save-runner --config editor.json --ipc-mode
//!
//! In IPC mode each stdin line is one JSON command; each reply is one
//! JSON UI-state line on stdout.

use anyhow::Result;
use planner_core::{
    backend::SaveBackend,
    config::EditorConfig,
    editor::Editor,
    error::EditorResult,
    power::PowerBudget,
    reference::ReferenceData,
    save::{FacilityKind, SaveDescriptor, SaveDocument, Shift},
    save_list::SortSpec,
    store::SaveStore,
    types::Level,
};
use std::cell::RefCell;
use std::env;
use std::io::{self, BufRead, Write};
use std::rc::Rc;
use std::time::Duration;

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcCommand {
    GetState,
    List,
    Create,
    Export { name: String },
    Delete { name: String },
    Rename { old: String, new: String },
    SortMode,
    SortOrder,
    Open { name: String },
    Close,
    SetLevel { kind: FacilityKind, index: usize, level: Level },
    AddShift {
        kind:      FacilityKind,
        index:     usize,
        #[serde(rename = "char")]
        character: String,
        start:     u32,
        end:       u32,
    },
    Power,
    Zoom { axis: Axis, delta: f64 },
    ZoomShortcut,
    Advance { ms: u64 },
    ClearError,
    Quit,
}

#[derive(Debug, Clone, Copy, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
enum Axis {
    X,
    Y,
}

#[derive(serde::Serialize)]
struct ZoomState {
    x:        f64,
    y:        f64,
    x_scale:  f64,
    y_scale:  f64,
    shortcut: &'static str,
}

#[derive(serde::Serialize)]
struct UiState {
    title:           String,
    saves:           Vec<SaveDescriptor>,
    sort:            SortSpec,
    next_mode_desc:  &'static str,
    next_order_desc: &'static str,
    export_notice:   bool,
    active_save:     Option<String>,
    loading:         bool,
    power:           Option<PowerBudget>,
    zoom:            ZoomState,
    error:           Option<String>,
}

/// SaveStore plus a window title, standing in for the desktop shell.
struct RunnerBackend {
    store:  SaveStore,
    config: EditorConfig,
    title:  RefCell<String>,
}

impl RunnerBackend {
    fn new(store: SaveStore, config: EditorConfig) -> Self {
        let title = RefCell::new(config.title_for(None));
        Self { store, config, title }
    }

    fn title(&self) -> String {
        self.title.borrow().clone()
    }
}

impl SaveBackend for RunnerBackend {
    fn fetch_saves(&self) -> EditorResult<Vec<SaveDescriptor>> {
        self.store.fetch_saves()
    }

    fn create_save(&self) -> EditorResult<()> {
        self.store.create_save()
    }

    fn export_save(&self, name: &str) -> EditorResult<()> {
        self.store.export_save(name)
    }

    fn delete_save(&self, name: &str) -> EditorResult<()> {
        self.store.delete_save(name)
    }

    fn get_save(&self, name: &str) -> EditorResult<SaveDocument> {
        self.store.get_save(name)
    }

    fn update_save(&self, name: &str, document: &SaveDocument) -> EditorResult<()> {
        self.store.update_save(name, document)
    }

    fn rename_save(&self, old: &str, new: &str) -> EditorResult<()> {
        self.store.rename_save(old, new)
    }

    fn rename_window(&self, name: Option<&str>) -> EditorResult<()> {
        *self.title.borrow_mut() = self.config.title_for(name);
        Ok(())
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");

    let mut config = match find_arg(&args, "--config") {
        Some(path) => EditorConfig::load(path)?,
        None => EditorConfig::default(),
    };
    if let Some(db) = find_arg(&args, "--db") {
        config.db_path = db.to_string();
    }
    if let Some(data_dir) = find_arg(&args, "--data-dir") {
        config.data_dir = data_dir.to_string();
    }
    if let Some(export_dir) = find_arg(&args, "--export-dir") {
        config.export_dir = export_dir.to_string();
    }

    if !ipc_mode {
        println!("Base Planner: save-runner");
        println!("  db:          {}", config.db_path);
        println!("  data_dir:    {}", config.data_dir);
        println!("  export_dir:  {}", config.export_dir);
        println!();
    }

    let store = SaveStore::open(&config.db_path, &config.export_dir)?
        .with_default_name(&config.default_save_name);
    store.migrate()?;

    let reference = ReferenceData::load(&config.data_dir)?;
    let backend = Rc::new(RunnerBackend::new(store, config.clone()));
    let mut editor = Editor::new(backend.clone(), reference, &config)?;
    editor.saves.load();

    if ipc_mode {
        run_ipc_loop(&mut editor, &backend)?;
    } else {
        print_summary(&mut editor)?;
    }

    Ok(())
}

fn find_arg<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|pair| pair[0] == flag)
        .map(|pair| pair[1].as_str())
}

fn run_ipc_loop(editor: &mut Editor, backend: &RunnerBackend) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }
        if buffer.trim().is_empty() {
            continue;
        }

        let cmd: IpcCommand = match serde_json::from_str(&buffer) {
            Ok(c) => c,
            Err(e) => {
                log::warn!("Unparseable command: {}", buffer.trim());
                let err_json = serde_json::json!({ "error": e.to_string() });
                writeln!(stdout, "{}", err_json)?;
                stdout.flush()?;
                continue;
            }
        };

        if matches!(cmd, IpcCommand::Quit) {
            break;
        }
        if let IpcCommand::Power = cmd {
            writeln!(stdout, "{}", serde_json::to_string(&editor.power_budget())?)?;
            stdout.flush()?;
            continue;
        }

        handle_command(editor, cmd);
        let state = build_ui_state(editor, backend);
        writeln!(stdout, "{}", serde_json::to_string(&state)?)?;
        stdout.flush()?;
    }
    Ok(())
}

fn handle_command(editor: &mut Editor, cmd: IpcCommand) {
    match cmd {
        IpcCommand::GetState | IpcCommand::Power | IpcCommand::Quit => {}
        IpcCommand::List => editor.saves.load(),
        IpcCommand::Create => editor.saves.create(),
        IpcCommand::Export { name } => editor.saves.export(&name),
        IpcCommand::Delete { name } => editor.delete_save(&name),
        IpcCommand::Rename { old, new } => editor.rename_save(&old, &new),
        IpcCommand::SortMode => editor.saves.toggle_mode(),
        IpcCommand::SortOrder => editor.saves.toggle_order(),
        IpcCommand::Open { name } => {
            let outcome = editor.open(&name);
            log::debug!("Open '{name}': {outcome:?}");
        }
        IpcCommand::Close => editor.session.close(),
        IpcCommand::SetLevel { kind, index, level } => {
            if !editor.set_level(kind, index, level) {
                log::warn!("Cannot set {} #{index} to level {level}", kind.as_str());
            }
        }
        IpcCommand::AddShift { kind, index, character, start, end } => {
            let shift = Shift { character, start, end };
            if !editor.add_shift(kind, index, shift) {
                log::warn!("No room for shift in {} #{index} over [{start}, {end})", kind.as_str());
            }
        }
        IpcCommand::Zoom { axis: Axis::X, delta } => editor.zoom.change_x(delta),
        IpcCommand::Zoom { axis: Axis::Y, delta } => editor.zoom.change_y(delta),
        IpcCommand::ZoomShortcut => editor.zoom.run_shortcut(),
        IpcCommand::Advance { ms } => editor.zoom.advance(Duration::from_millis(ms)),
        IpcCommand::ClearError => editor.errors.clear(),
    }
}

fn build_ui_state(editor: &mut Editor, backend: &RunnerBackend) -> UiState {
    let sort = editor.saves.sort();
    UiState {
        title:           backend.title(),
        saves:           editor.saves.sorted(),
        sort,
        next_mode_desc:  sort.next_mode_desc(),
        next_order_desc: sort.next_order_desc(),
        // Shown once, then dismissed.
        export_notice:   editor.saves.export_notice.take(),
        active_save:     editor.session.name().map(str::to_string),
        loading:         editor.session.is_loading(),
        power:           editor.power_budget(),
        zoom: ZoomState {
            x:        editor.zoom.x_factor(),
            y:        editor.zoom.y_factor(),
            x_scale:  editor.zoom.x_scale(),
            y_scale:  editor.zoom.y_scale(),
            shortcut: editor.zoom.shortcut().description(),
        },
        error:           editor.errors.current(),
    }
}

fn print_summary(editor: &mut Editor) -> Result<()> {
    let saves = editor.saves.sorted();

    println!("=== SAVES ({}) ===", saves.len());
    if saves.is_empty() {
        println!("  (No saves yet)");
    }
    for save in &saves {
        println!(
            "  {:<24} created {:>14}  modified {:>14}",
            save.name, save.created, save.modified
        );
    }

    if let Some(latest) = saves.last() {
        if editor.open(&latest.name) == planner_core::session::LoadOutcome::Installed {
            if let Some(power) = editor.power_budget() {
                println!();
                println!("=== POWER ({}) ===", latest.name);
                println!("  consumed:  {}", power.consumed);
                println!("  maximum:   {}", power.maximum);
                println!("  remaining: {}", power.remaining());
            }
        }
    }

    if let Some(error) = editor.errors.current() {
        println!();
        println!("  error: {error}");
    }
    Ok(())
}

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use poverka::notify::{self, Notice, Severity};
use poverka::records::LoadedRecords;
use poverka::{
    build_csv, export_file_name, find_device, AppConfig, BackOutcome, FileStore, RecordStore,
    Stage, WizardManager, DEVICE_OPTIONS,
};

#[derive(Parser, Debug)]
#[command(
    name = "poverka_cli",
    about = "Data-entry wizard for calibration measurement records"
)]
struct Cli {
    /// Path to the JSON config file
    #[arg(long, default_value = "poverka.json")]
    config: PathBuf,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the devices data can be entered for
    Devices,
    /// Run the measurement wizard for one device
    Fill {
        /// Device id from the catalog (see `devices`)
        #[arg(long)]
        device: String,
    },
    /// List the stored measurement records
    Records,
    /// Export the stored records as CSV
    Export {
        /// Output file (defaults to records_<timestamp>.csv)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Delete all stored records
    Clear {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

fn main() -> ExitCode {
    poverka::init_logging();
    match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:?}");
            ExitCode::from(1)
        }
    }
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();
    let config = AppConfig::load_from_file(&cli.config);
    let store = RecordStore::new(Box::new(FileStore::new(&config.storage.data_dir)));

    match cli.command {
        Commands::Devices => run_devices(),
        Commands::Fill { device } => run_fill(&device, store, &config),
        Commands::Records => run_records(store, &config),
        Commands::Export { output } => run_export(store, &config, output),
        Commands::Clear { yes } => run_clear(store, yes),
    }
}

fn run_devices() -> Result<ExitCode> {
    println!("Доступные устройства:");
    for option in DEVICE_OPTIONS {
        println!("  {:12} {} — {}", option.id, option.name, option.description);
    }
    Ok(ExitCode::from(0))
}

/// Interactive wizard loop over stdin
///
/// Commands inside any prompt: `b` goes one step back, `q` quits.
fn run_fill(device_id: &str, store: RecordStore, config: &AppConfig) -> Result<ExitCode> {
    let Some(device) = find_device(device_id) else {
        // Missing device context is fatal for this flow: redirect the
        // operator to device selection
        eprintln!("Тип устройства не указан. Пожалуйста, выберите устройство.");
        run_devices()?;
        return Ok(ExitCode::from(1));
    };

    let runtime = tokio::runtime::Runtime::new().context("starting async runtime")?;
    let _guard = runtime.enter();

    let hub = notify::hub().clone();
    let manager = WizardManager::new(device.clone(), store, hub.clone(), &config.wizard);

    // Render notices the way the original UI rendered toasts
    let mut notices = hub.subscribe();
    runtime.spawn(async move {
        while let Ok(notice) = notices.recv().await {
            let marker = match notice.severity() {
                Severity::Info => "·",
                Severity::Success => "✓",
                Severity::Warning => "!",
                Severity::Error => "✗",
            };
            println!("  {} {}: {}", marker, notice.title(), notice.message());
        }
    });

    println!("{} :: ввод данных", device.device_name);
    loop {
        let snapshot = manager.snapshot()?;
        let line = match snapshot.stage {
            Stage::Identify => prompt("Серийный номер")?,
            Stage::SelectPoint => {
                println!("Доступные точки поверки:");
                for point in poverka::reference_points() {
                    println!(
                        "  {}  (поправка {}, пределы {}...{})",
                        point.label, point.correction, point.lower_limit, point.upper_limit
                    );
                }
                prompt("Точка поверки (значение)")?
            }
            Stage::EnterMeasurement => prompt(&format!(
                "Измерение ({}/{})",
                snapshot.collected + 1,
                snapshot.needed
            ))?,
            Stage::Completed => {
                // Give the auto-reset timer room to fire, then continue
                // with the next unit
                std::thread::sleep(Duration::from_secs(config.wizard.auto_reset_secs) + Duration::from_millis(200));
                continue;
            }
        };

        let Some(line) = line else {
            break; // EOF ends the session
        };
        match line.as_str() {
            "q" => break,
            "b" => {
                if manager.go_back()? == BackOutcome::ExitToDeviceSelection {
                    break;
                }
            }
            text => dispatch(&manager, snapshot.stage, text),
        }
    }

    // Let trailing notices flush before the runtime goes away
    std::thread::sleep(Duration::from_millis(50));
    Ok(ExitCode::from(0))
}

/// Forward one line of input to the stage that consumes it
///
/// Rejections are already rendered as notices; the caller simply
/// re-prompts.
fn dispatch(manager: &WizardManager, stage: Stage, text: &str) {
    match stage {
        Stage::Identify => {
            let _ = manager.submit_serial(text);
        }
        Stage::SelectPoint => {
            let _ = manager.select_point(text);
        }
        Stage::EnterMeasurement => {
            // Line input gets the same shaping as keystroke entry
            let shaped = poverka::wizard::sanitize_measurement_input("", text);
            let _ = manager.submit_measurement(&shaped);
        }
        Stage::Completed => {}
    }
}

fn run_records(store: RecordStore, config: &AppConfig) -> Result<ExitCode> {
    let LoadedRecords { records, recovered } = store
        .load_all()
        .context("loading stored records")?;
    if recovered {
        announce(Notice::StorageRecovered);
    }
    if records.is_empty() {
        println!("Нет сохраненных записей.");
        return Ok(ExitCode::from(0));
    }

    for record in &records {
        let cells: Vec<String> = (0..config.wizard.measurements_per_point)
            .map(|i| match record.measurements.get(i) {
                Some(value) => format!("{:.2}", value),
                None => "–".to_string(),
            })
            .collect();
        println!(
            "{}  S/N {}  {}  {}  [{}]  скорр.ср {:.2}  {}",
            record.timestamp,
            record.serial_number,
            record.device_name,
            record.selected_point_label,
            cells.join(", "),
            record.corrected_average_measurement,
            record.result
        );
    }
    println!("Всего записей: {}", records.len());
    Ok(ExitCode::from(0))
}

fn run_export(
    store: RecordStore,
    config: &AppConfig,
    output: Option<PathBuf>,
) -> Result<ExitCode> {
    let LoadedRecords { records, recovered } = store
        .load_all()
        .context("loading stored records")?;
    if recovered {
        announce(Notice::StorageRecovered);
    }

    let csv = match build_csv(&records, config.wizard.measurements_per_point) {
        Ok(csv) => csv,
        Err(_) => {
            announce(Notice::NothingToExport);
            return Ok(ExitCode::from(0));
        }
    };

    let path = output.unwrap_or_else(|| PathBuf::from(export_file_name(Local::now())));
    fs::write(&path, csv).with_context(|| format!("writing {}", path.display()))?;
    println!("CSV файл сохранен: {}", path.display());
    Ok(ExitCode::from(0))
}

fn run_clear(store: RecordStore, yes: bool) -> Result<ExitCode> {
    if !yes {
        let answer = prompt("Вы уверены, что хотите удалить все записи? Это действие необратимо. [y/N]")?;
        if answer.as_deref() != Some("y") {
            println!("Отменено.");
            return Ok(ExitCode::from(0));
        }
    }
    store.clear().context("clearing records")?;
    announce(Notice::RecordsCleared);
    Ok(ExitCode::from(0))
}

/// Publish a notice to the global hub and render it immediately
///
/// Non-wizard commands have no subscriber task running, so the toast
/// is printed inline.
fn announce(notice: Notice) {
    println!("{}: {}", notice.title(), notice.message());
    notify::hub().publish(notice);
}

/// Print a prompt and read one trimmed line; `None` on EOF
fn prompt(label: &str) -> Result<Option<String>> {
    print!("{}: ", label);
    io::stdout().flush()?;
    let mut line = String::new();
    let read = io::stdin().read_line(&mut line)?;
    if read == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

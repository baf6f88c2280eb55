// Entry point and high-level CLI flow.
//
// The dataset is loaded once at startup. Every menu action that changes the
// selection is applied only if it validates; "show" and "export" then run a
// full render pass against the loaded data.
mod aggregate;
mod charts;
mod cli;
mod config;
mod dashboard;
mod error;
mod filter;
mod insights;
mod loader;
mod output;
mod ranking;
mod types;
mod util;

use clap::Parser;
use cli::Args;
use config::DashboardConfig;
use dashboard::Dashboard;
use error::Result;
use filter::validate_selection;
use loader::DatasetStore;
use std::error::Error;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use types::Selection;

const DEFAULT_EXPORT_DIR: &str = "dashboard_export";

struct App {
    config: DashboardConfig,
    store: DatasetStore,
    dashboard: Dashboard,
    selection: Selection,
}

impl App {
    fn start(config: DashboardConfig, district: Option<&str>) -> Result<Self> {
        let store = DatasetStore::new(config.data_path.clone(), config.state.clone());
        let dataset = store.get()?;
        let report = dataset.report.clone();
        println!(
            "Processing dataset... ({} rows read, {} kept for {})",
            util::format_int(report.total_rows),
            util::format_int(report.state_rows),
            util::title_case(&config.state)
        );
        if report.parse_errors > 0 {
            println!(
                "Note: {} rows skipped due to parse/validation errors.",
                util::format_int(report.parse_errors)
            );
        }
        let dashboard = Dashboard::new(dataset, &config)?;
        let selection = dashboard.initial_selection(district, &config)?;
        Ok(App {
            config,
            store,
            dashboard,
            selection,
        })
    }

    fn show(&self) {
        match self.dashboard.render(&self.selection) {
            Ok(view) => output::print_dashboard(&view),
            Err(e) => println!("Error: {}\n", e),
        }
    }

    fn export(&self, dir: &Path) {
        let result = self
            .dashboard
            .render(&self.selection)
            .and_then(|view| output::export(&view, self.dashboard.state_display(), dir));
        match result {
            Ok(files) => {
                println!("Outputs saved to {}:", dir.display());
                for f in files {
                    println!("  {}", f.display());
                }
                println!();
            }
            Err(e) => println!("Export failed: {}\n", e),
        }
    }

    /// Apply `candidate` only if it is a selection the dashboard accepts.
    fn try_select(&mut self, candidate: Selection) {
        match validate_selection(
            &candidate,
            self.dashboard.districts(),
            self.dashboard.year_bounds(),
        ) {
            Ok(()) => self.selection = candidate,
            Err(e) => println!("Error: {}\n", e),
        }
    }

    fn reload(&mut self) {
        let rebuilt = self
            .store
            .reload()
            .and_then(|dataset| Dashboard::new(dataset, &self.config));
        match rebuilt {
            Ok(dashboard) => {
                self.dashboard = dashboard;
                let keep = validate_selection(
                    &self.selection,
                    self.dashboard.districts(),
                    self.dashboard.year_bounds(),
                )
                .is_ok();
                if !keep {
                    match self.dashboard.initial_selection(None, &self.config) {
                        Ok(s) => self.selection = s,
                        Err(e) => println!("Error: {}\n", e),
                    }
                }
                info!(path = %self.store.path().display(), "dataset reloaded");
                println!("Dataset reloaded.\n");
            }
            Err(e) => println!("Reload failed, keeping the previous data: {}\n", e),
        }
    }
}

/// Print `label` and read one trimmed line. `None` means stdin is closed.
fn prompt(label: &str) -> Option<String> {
    print!("{}", label);
    let _ = io::stdout().flush();
    let mut buf = String::new();
    match io::stdin().read_line(&mut buf) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(buf.trim().to_string()),
    }
}

fn prompt_district(app: &mut App) -> Option<()> {
    output::print_districts(
        app.dashboard.state_display(),
        app.dashboard.rank_by(),
        app.dashboard.ranking(),
    );
    let answer = prompt("Select district (rank or name): ")?;
    let districts = app.dashboard.districts();
    let district = match answer.parse::<usize>() {
        Ok(rank) if rank >= 1 && rank <= districts.len() => districts[rank - 1].clone(),
        _ => districts
            .iter()
            .find(|d| d.eq_ignore_ascii_case(&answer))
            .cloned()
            .unwrap_or(answer),
    };
    let candidate = Selection {
        district,
        ..app.selection.clone()
    };
    app.try_select(candidate);
    Some(())
}

fn prompt_years(app: &mut App) -> Option<()> {
    let (min, max) = app.dashboard.year_bounds();
    let from = prompt(&format!("From year ({}-{}): ", min, max))?;
    let to = prompt(&format!("To year ({}-{}): ", min, max))?;
    match (from.parse::<i32>(), to.parse::<i32>()) {
        (Ok(lo), Ok(hi)) => {
            let candidate = Selection {
                years: (lo, hi),
                ..app.selection.clone()
            };
            app.try_select(candidate);
        }
        _ => println!("Invalid year. Please enter whole numbers.\n"),
    }
    Some(())
}

fn run_menu(app: &mut App) {
    loop {
        let (lo, hi) = app.selection.years;
        println!("{} Agriculture Explorer", app.dashboard.state_display());
        println!("[1] Select district (current: {})", app.selection.district);
        println!("[2] Set year range (current: {}–{})", lo, hi);
        println!(
            "[3] Toggle log scale (currently {})",
            if app.selection.log_scale { "ON" } else { "OFF" }
        );
        println!("[4] Show dashboard");
        println!("[5] Export charts and reports");
        println!("[6] Reload dataset");
        println!("[0] Exit\n");

        let Some(choice) = prompt("Enter choice: ") else {
            break;
        };
        let answered = match choice.as_str() {
            "1" => prompt_district(app),
            "2" => prompt_years(app),
            "3" => {
                app.selection.log_scale = !app.selection.log_scale;
                Some(())
            }
            "4" => {
                app.show();
                Some(())
            }
            "5" => {
                let dir = match &app.config.out_dir {
                    Some(d) => d.clone(),
                    None => {
                        let Some(answer) =
                            prompt(&format!("Export directory [{}]: ", DEFAULT_EXPORT_DIR))
                        else {
                            break;
                        };
                        if answer.is_empty() {
                            PathBuf::from(DEFAULT_EXPORT_DIR)
                        } else {
                            PathBuf::from(answer)
                        }
                    }
                };
                app.export(&dir);
                Some(())
            }
            "6" => {
                app.reload();
                Some(())
            }
            "0" => break,
            _ => {
                println!("Invalid choice. Please enter 0-6.\n");
                Some(())
            }
        };
        if answered.is_none() {
            break;
        }
    }
    println!("Exiting the program.");
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "warn" }));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}

fn main() -> std::result::Result<(), Box<dyn Error>> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let config = DashboardConfig::resolve(&args)?;
    let mut app = match App::start(config, args.district.as_deref()) {
        Ok(app) => app,
        Err(e) => {
            error!("startup failed: {}", e);
            return Err(e.into());
        }
    };

    if args.once {
        app.show();
        if let Some(dir) = app.config.out_dir.clone() {
            app.export(&dir);
        }
        return Ok(());
    }

    run_menu(&mut app);
    Ok(())
}

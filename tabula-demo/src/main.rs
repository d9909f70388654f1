mod app;
mod paths;
mod users;

use std::fs::{self, File};
use std::path::Path;
use std::sync::Arc;

use simplelog::{Config, LevelFilter, WriteLogger};
use tabula::persist::{KeyValueStore, MemoryStore, SqliteStore, StoreConfig};
use tabula::wakeup;
use tokio::io::{AsyncBufReadExt, BufReader};

use app::{Command, Demo, HELP};
use paths::DemoPaths;

fn init_logging(path: &Path) {
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    match File::create(path) {
        Ok(file) => {
            if let Err(e) = WriteLogger::init(LevelFilter::Debug, Config::default(), file) {
                eprintln!("Failed to initialize logger: {}", e);
            }
        }
        Err(e) => eprintln!("Failed to create log file {}: {}", path.display(), e),
    }
}

/// Open the on-disk store, falling back to memory when it is unavailable.
fn open_store(state_db: Option<&Path>) -> Arc<dyn KeyValueStore> {
    let opened = state_db.map(|path| SqliteStore::open(&StoreConfig::file(path)));
    match opened {
        Some(Ok(store)) => Arc::new(store),
        Some(Err(e)) => {
            log::warn!("State database unavailable, nothing will be remembered: {}", e);
            Arc::new(MemoryStore::new())
        }
        None => {
            log::warn!("No data directory, nothing will be remembered");
            Arc::new(MemoryStore::new())
        }
    }
}

#[tokio::main]
async fn main() {
    let paths = DemoPaths::resolve();
    init_logging(&paths.log);
    log::info!("Starting tabula-demo");

    let (wakeup_tx, mut wakeup_rx) = wakeup::channel();
    let mut demo = Demo::new(open_store(paths.state_db.as_deref()), wakeup_tx);
    println!("{}\n\n{}", HELP, demo.render());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let line = match line {
                    Ok(Some(line)) => line,
                    Ok(None) => break,
                    Err(e) => {
                        log::error!("Failed to read input: {}", e);
                        break;
                    }
                };
                let Some(command) = Command::parse(&line) else {
                    println!("{}", HELP);
                    continue;
                };
                if !demo.apply(command) {
                    break;
                }
                println!("\n{}", demo.render());
            }

            // A debounced search committed or a load finished
            Some(()) = wakeup_rx.recv() => {
                wakeup_rx.drain();
                println!("\n{}", demo.render());
            }
        }
    }

    log::info!("Exiting tabula-demo");
}

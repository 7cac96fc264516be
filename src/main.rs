use chatterdle::cli::parse_cli;
use chatterdle::session::GameSession;
use chatterdle::settings::Settings;
use chatterdle::tui::{App, Tui};
use chatterdle::{chat, logging};
use std::sync::mpsc;

fn main() {
    let cli = parse_cli();

    if let Some(path) = logging::init_file_logger() {
        log::info!("chatterdle starting, logging to {}", path.display());
    }

    let mut settings = Settings::load();
    cli.apply_to(&mut settings);
    let Some(channel) = settings.channel.clone() else {
        eprintln!("No channel given. Pass --channel <name> (it is remembered for next time).");
        std::process::exit(2);
    };
    if let Err(e) = settings.save() {
        log::warn!("failed to persist settings: {e}");
    }

    // Chat arrivals land in an mpsc channel; the TUI loop drains it between
    // frames so all state mutation stays on one thread.
    let chat_rx = match chat::connect(&channel) {
        Ok(conn) => {
            let (tx, rx) = mpsc::channel();
            chat::spawn_reader(conn.reader, Some(conn.writer), channel.clone(), tx);
            Some(rx)
        }
        Err(e) => {
            eprintln!("Could not connect to #{channel} chat: {e}. Running without a feed.");
            log::error!("chat connect failed: {e}");
            None
        }
    };

    let input_mode = cli.input_mode.into();
    let session = match cli.seed {
        Some(seed) => GameSession::seeded(input_mode, seed),
        None => GameSession::new(input_mode),
    };
    let filter = cli.filter();
    let mut app = App::new(channel, settings, filter, session, chat_rx);

    let mut tui = match Tui::new() {
        Ok(tui) => tui,
        Err(e) => {
            eprintln!("Failed to initialize terminal: {e}");
            std::process::exit(1);
        }
    };
    if let Err(e) = tui.run(&mut app) {
        log::error!("terminal error: {e}");
    }
}

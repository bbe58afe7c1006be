//! Opens a window with a quiz player.
//!
//! ```text
//! cargo run --example quiz -- [--config quiz.toml] [media file]
//! ```
//! Without a media file on the command line or in the config, a file dialog asks for one.
//! Set `RUST_LOG=egui_quiz_player=debug` to follow the session.

use eframe::{egui, App, NativeOptions};
use egui::CentralPanel;
use egui_quiz_player::{config, config::QuizConfig, QuizPlayer};
use std::{error::Error, path::PathBuf};

struct QuizApp {
    quiz_player: QuizPlayer,
}

impl App for QuizApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        CentralPanel::default().show(ctx, |ui| {
            self.quiz_player.ui(ui);
        });
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    pretty_env_logger::init();

    let mut args = pico_args::Arguments::from_env();
    let config_path: Option<PathBuf> = args.opt_value_from_str("--config")?;
    let media_arg: Option<String> = args.opt_free_from_str()?;

    let quiz_config = match config_path {
        Some(path) => config::load_from_path(&path)?,
        None => QuizConfig::default(),
    };

    let media = match media_arg.or_else(|| quiz_config.media.clone()) {
        Some(media) => media,
        None => match rfd::FileDialog::new()
            .add_filter(
                "media",
                &["mp4", "m4v", "mov", "mkv", "mp3", "wav", "m4a", "flac", "ogg"],
            )
            .pick_file()
        {
            Some(path) => path.to_string_lossy().into_owned(),
            None => {
                log::info!("no media selected");
                return Ok(());
            }
        },
    };

    // probing and playback threads are spawned on this runtime
    let runtime = tokio::runtime::Runtime::new()?;
    let _guard = runtime.enter();

    let quiz_player = QuizPlayer::from_path(&media, &quiz_config)?;
    log::info!("starting quiz on {media}");

    eframe::run_native(
        "Video quiz",
        NativeOptions::default(),
        Box::new(|_| Ok(Box::new(QuizApp { quiz_player }))),
    )?;
    Ok(())
}

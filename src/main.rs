//! Desktop editor: `stageview [project.json] [--options file.toml] [--spin]`.

use std::path::PathBuf;

use stageview::{Editor, Options};

#[derive(Default)]
struct Args {
    scene: Option<PathBuf>,
    options: Option<PathBuf>,
    spin: bool,
}

fn parse_args() -> Result<Args, String> {
    let mut args = Args::default();
    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--options" => {
                let path = iter.next().ok_or("--options needs a path")?;
                args.options = Some(PathBuf::from(path));
            }
            "--spin" => args.spin = true,
            flag if flag.starts_with("--") => {
                return Err(format!("unknown flag: {flag}"));
            }
            _ if args.scene.is_none() => args.scene = Some(PathBuf::from(arg)),
            _ => return Err(format!("unexpected argument: {arg}")),
        }
    }
    Ok(args)
}

fn main() {
    env_logger::init();

    let args = match parse_args() {
        Ok(args) => args,
        Err(e) => {
            log::error!("{e}");
            log::error!(
                "Usage: stageview [project.json] [--options file.toml] [--spin]"
            );
            std::process::exit(1);
        }
    };

    let options = match &args.options {
        Some(path) => match Options::load(path) {
            Ok(options) => options,
            Err(e) => {
                log::error!("{e}");
                std::process::exit(1);
            }
        },
        None => Options::default(),
    };

    let mut builder = Editor::builder()
        .with_options(options)
        .with_spin(args.spin);
    builder = match args.scene {
        Some(path) => builder.with_scene_path(path),
        None => builder.with_scaffold(true),
    };

    if let Err(e) = builder.build().run() {
        log::error!("{e}");
        std::process::exit(1);
    }
}

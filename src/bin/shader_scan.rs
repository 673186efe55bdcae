use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context};
use clap::Parser;
use serde::Serialize;
use shader_ast::{parse_file, ParsedShader, ShaderKind, ShaderStage, TracingSink};

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Shader file, or folder of .hlsl files
    #[clap(value_parser, default_value = "shaders")]
    shaders: PathBuf,
    /// Where the JSON summaries and rewritten sources are written
    #[clap(short, long, value_parser, default_value = "out")]
    destination: PathBuf,
    /// Shader model used for entry point profiles, e.g. 6_5 gives vs_6_5
    #[clap(short, long, value_parser, default_value = "6_5")]
    model: String,
    #[clap(short, long, value_enum, default_value = "graphics")]
    kind: ShaderKind,
}

#[derive(Serialize)]
struct EntryPoint {
    stage: ShaderStage,
    function: &'static str,
    profile: String,
}

#[derive(Serialize)]
struct Summary<'a> {
    file: String,
    entry_points: Vec<EntryPoint>,
    #[serde(flatten)]
    shader: &'a ParsedShader,
}

fn shader_files(path: &Path) -> anyhow::Result<Vec<PathBuf>> {
    if !path.is_dir() {
        return Ok(vec![path.to_owned()]);
    }
    let mut files = vec![];
    for entry in fs::read_dir(path).with_context(|| format!("listing {}", path.display()))? {
        let file = entry?.path();
        if file.extension().map_or(false, |ext| ext == "hlsl") {
            files.push(file);
        }
    }
    files.sort();
    Ok(files)
}

fn scan(path: &Path, args: &Args) -> anyhow::Result<()> {
    let shader = parse_file(path, args.kind, &TracingSink)
        .with_context(|| format!("parsing {}", path.display()))?;

    let entry_points = shader
        .entry_points()
        .into_iter()
        .map(|stage| EntryPoint {
            stage,
            function: stage.entry_point(),
            profile: stage.profile(&args.model),
        })
        .collect();
    let summary = Summary {
        file: path.display().to_string(),
        entry_points,
        shader: &shader,
    };

    let stem = path
        .file_stem()
        .with_context(|| format!("{} has no file name", path.display()))?
        .to_string_lossy();
    let json_path = args.destination.join(format!("{}.json", stem));
    fs::write(&json_path, serde_json::to_string_pretty(&summary)?)
        .with_context(|| format!("writing {}", json_path.display()))?;

    let source = fs::read_to_string(path)?;
    let hlsl_path = args.destination.join(format!("{}.compiler.hlsl", stem));
    fs::write(&hlsl_path, shader.compiler_source(&source))
        .with_context(|| format!("writing {}", hlsl_path.display()))?;

    tracing::info!(
        "{}: {} structs, {} functions, {} diagnostics",
        path.display(),
        shader.structs.len(),
        shader.functions.len(),
        shader.diagnostics.len()
    );
    Ok(())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    fs::create_dir_all(&args.destination)
        .with_context(|| format!("creating {}", args.destination.display()))?;

    let files = shader_files(&args.shaders)?;
    let mut failed = 0;
    for path in &files {
        if let Err(e) = scan(path, &args) {
            tracing::error!("{:#}", e);
            failed += 1;
        }
    }

    if failed > 0 {
        bail!("{} of {} shaders failed", failed, files.len());
    }
    Ok(())
}

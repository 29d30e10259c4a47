use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

use memeforge::{FontBook, GenerateReport, Generator, GeneratorOpts, RawInput, TemplateRegistry};

#[derive(Parser, Debug)]
#[command(name = "memeforge", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List template ids found in a template directory.
    List(ListArgs),
    /// Render one template to a PNG or GIF file.
    Render(RenderArgs),
}

#[derive(Parser, Debug)]
struct ListArgs {
    /// Directory holding `<id>.json` documents and `<id>/` frame assets.
    #[arg(long)]
    templates: PathBuf,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Directory holding `<id>.json` documents and `<id>/` frame assets.
    #[arg(long)]
    templates: PathBuf,

    /// Directory of `.ttf`/`.otf` faces, keyed by file stem.
    #[arg(long)]
    fonts: Option<PathBuf>,

    /// Template id.
    #[arg(long)]
    id: String,

    /// Input in source order: `image:PATH` or `text:VALUE`.
    #[arg(short = 'i', long = "input", value_parser = parse_input)]
    inputs: Vec<InputArg>,

    /// Output file path.
    #[arg(long)]
    out: PathBuf,

    /// Gap between lines of multi-line text, in pixels.
    #[arg(long, default_value_t = GeneratorOpts::default().line_spacing_px)]
    line_spacing: f32,
}

#[derive(Clone, Debug)]
enum InputArg {
    Image(PathBuf),
    Text(String),
}

fn parse_input(s: &str) -> Result<InputArg, String> {
    match s.split_once(':') {
        Some(("image", path)) if !path.is_empty() => Ok(InputArg::Image(PathBuf::from(path))),
        Some(("text", value)) => Ok(InputArg::Text(value.to_string())),
        _ => Err(format!("expected image:PATH or text:VALUE, got \"{s}\"")),
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::List(args) => cmd_list(args),
        Command::Render(args) => cmd_render(args),
    }
}

fn cmd_list(args: ListArgs) -> anyhow::Result<()> {
    let registry = TemplateRegistry::load_dir(&args.templates)?;
    for id in registry.ids() {
        let entry = registry.lookup(id)?;
        let t = entry.template();
        println!(
            "{id}\t{}\t{}x{}\t{} frame(s)",
            t.output_kind.as_str(),
            t.output_size.width,
            t.output_size.height,
            entry.base_frame_count()
        );
    }
    Ok(())
}

fn read_inputs(inputs: &[InputArg]) -> anyhow::Result<Vec<RawInput>> {
    inputs
        .iter()
        .map(|arg| match arg {
            InputArg::Image(path) => std::fs::read(path)
                .with_context(|| format!("read input image '{}'", path.display()))
                .map(RawInput::Image),
            InputArg::Text(s) => Ok(RawInput::Text(s.clone())),
        })
        .collect()
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let report = match render(&args) {
        Ok(report) => report,
        Err(e) => GenerateReport::from(e),
    };
    println!("{}", serde_json::to_string(&report)?);
    if report.code != 1 {
        std::process::exit(1);
    }
    Ok(())
}

fn render(args: &RenderArgs) -> memeforge::MemeResult<GenerateReport> {
    let registry = TemplateRegistry::load_dir(&args.templates)?;
    let fonts = match &args.fonts {
        Some(dir) => FontBook::load_dir(dir)?,
        None => FontBook::new(),
    };
    let opts = GeneratorOpts {
        line_spacing_px: args.line_spacing,
        ..GeneratorOpts::default()
    };
    let generator = Generator::new(registry, fonts, opts);

    let inputs = read_inputs(&args.inputs)?;
    let result = generator.generate(&args.id, &inputs);
    if let Ok(generated) = &result {
        generated.write_to(&args.out)?;
    }
    Ok(GenerateReport::from_result(&result, Some(Path::new(&args.out))))
}

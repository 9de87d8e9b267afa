//! image-salt - rewrite images from embedded attributes

use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};

use image_salt::options::{EmbedOptions, RebuildOptions};
use image_salt::util::{decode_text, sniff_meta_charset};
use image_salt::{Command, EmbedTo, Options, OptionsInput, load_options, process_html};

#[derive(Parser)]
#[command(name = "image-salt")]
#[command(version, about = "Rewrite img elements from attributes embedded in alt text or blocks", long_about = None)]
#[command(after_help = "EXAMPLES:
    image-salt rebuild < in.html > out.html
    image-salt --base-url https://example.com/ rebuild --tag-name nuxt-img
    image-salt embed --pick-attrs width --pick-attrs class --embed-to block
    image-salt --config passes.json < in.html")]
struct Cli {
    /// Only process images whose src starts with this URL
    #[arg(long, global = true, env = "IMAGE_SALT_BASE_URL", value_name = "URL")]
    base_url: Option<String>,

    /// Load one or more passes from a JSON file (other flags are ignored)
    #[arg(long, global = true, env = "IMAGE_SALT_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Encoding to try when stdin is not valid UTF-8
    #[arg(long, global = true, env = "IMAGE_SALT_ENCODING", value_name = "LABEL")]
    encoding: Option<String>,

    #[command(subcommand)]
    command: Option<CliCommand>,
}

#[derive(Subcommand)]
enum CliCommand {
    /// Apply embedded attributes and strip them from the text
    Rebuild {
        /// Tag name of the rebuilt element
        #[arg(long, env = "IMAGE_SALT_TAG_NAME", value_name = "TAG")]
        tag_name: Option<String>,

        /// Keep the base URL in src instead of making it root-relative
        #[arg(long, env = "IMAGE_SALT_KEEP_BASE_URL")]
        keep_base_url: bool,

        /// Attributes applied to every image, e.g. 'loading="lazy"'
        #[arg(long, env = "IMAGE_SALT_BASE_ATTRS", value_name = "ATTRS")]
        base_attrs: Option<String>,
    },
    /// Mirror element attributes into alt text or a block
    Embed {
        /// Attribute to mirror (repeatable; default: width, height)
        #[arg(long, env = "IMAGE_SALT_PICK_ATTRS", value_delimiter = ',', value_name = "NAME")]
        pick_attrs: Vec<String>,

        /// Where to write the attributes
        #[arg(long, env = "IMAGE_SALT_EMBED_TO", value_enum)]
        embed_to: Option<EmbedTarget>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum EmbedTarget {
    Alt,
    Block,
}

impl From<EmbedTarget> for EmbedTo {
    fn from(target: EmbedTarget) -> Self {
        match target {
            EmbedTarget::Alt => EmbedTo::Alt,
            EmbedTarget::Block => EmbedTo::Block,
        }
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn options_from_cli(cli: &Cli) -> Options {
    let mut opts = Options {
        base_url: cli.base_url.clone(),
        ..Default::default()
    };
    match &cli.command {
        None => {}
        Some(CliCommand::Rebuild {
            tag_name,
            keep_base_url,
            base_attrs,
        }) => {
            opts.command = Some(Command::Rebuild);
            opts.rebuild = Some(RebuildOptions {
                tag_name: tag_name.clone(),
                keep_base_url: Some(*keep_base_url),
                base_attrs: base_attrs.clone(),
            });
        }
        Some(CliCommand::Embed {
            pick_attrs,
            embed_to,
        }) => {
            opts.command = Some(Command::Embed);
            opts.embed = Some(EmbedOptions {
                embed_to: embed_to.map(EmbedTo::from),
                pick_attrs: (!pick_attrs.is_empty()).then(|| pick_attrs.clone()),
            });
        }
    }
    opts
}

fn run(cli: &Cli) -> image_salt::Result<()> {
    let input: OptionsInput = match &cli.config {
        Some(path) => load_options(path)?,
        None => options_from_cli(cli).into(),
    };

    let mut bytes = Vec::new();
    io::stdin().lock().read_to_end(&mut bytes)?;
    let hint = cli.encoding.as_deref().or_else(|| sniff_meta_charset(&bytes));
    let html = decode_text(&bytes, hint);

    let output = process_html(&html, &input)?;

    let mut stdout = io::stdout().lock();
    stdout.write_all(output.as_bytes())?;
    stdout.flush()?;
    Ok(())
}

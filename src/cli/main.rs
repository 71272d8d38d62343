//-
// Copyright (c) 2026, Jason Lingle
//
// This file is part of Fxics.
//
// Fxics is free software: you can  redistribute it and/or modify it under the
// terms of  the GNU General Public  License as published by  the Free Software
// Foundation, either version  3 of the License, or (at  your option) any later
// version.
//
// Fxics is distributed  in the hope that  it will be useful,  but WITHOUT ANY
// WARRANTY; without  even the implied  warranty of MERCHANTABILITY  or FITNESS
// FOR  A PARTICULAR  PURPOSE.  See the  GNU General  Public  License for  more
// details.
//
// You should have received a copy of the GNU General Public License along with
// Fxics. If not, see <http://www.gnu.org/licenses/>.

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use log::{debug, info};
use log4rs::append::console::{ConsoleAppender, Target};
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;
use log4rs::filter::threshold::ThresholdFilter;
use structopt::StructOpt;

use super::decode::{decode, StreamKind};
use crate::fx::idset::IdSet;
use crate::support::decode_config::DecodeConfig;

#[derive(StructOpt, Debug)]
#[structopt(max_term_width = 80)]
enum Command {
    /// Decode a stream and print every element in it.
    Dump(DecodeSubcommand),
    /// Decode a stream and print what it adds up to.
    ///
    /// This covers element counts, whether hierarchy changes are in
    /// parent-before-child order, the id sets in the deletions and state,
    /// and the property-group mappings of partial message changes.
    Summary(DecodeSubcommand),
    /// Decode a bare IDSET, such as the value of PidTagIdsetDeleted.
    Idset(IdsetSubcommand),
}

#[derive(StructOpt, Debug, Default)]
pub(super) struct CommonOptions {
    /// TOML file controlling how streams are decoded.
    #[structopt(long, parse(from_os_str))]
    config: Option<PathBuf>,

    /// log4rs configuration file. If not given, logs go to standard error
    /// at the level in the `[log]` table of the configuration.
    #[structopt(long, parse(from_os_str))]
    log_config: Option<PathBuf>,
}

#[derive(StructOpt, Debug)]
pub(super) struct DecodeSubcommand {
    #[structopt(flatten)]
    common: CommonOptions,

    /// What the stream holds: one of hierarchy-sync, contents-sync,
    /// top-folder, folder-content, message-content, message-list,
    /// attachment-content, state.
    #[structopt(long)]
    kind: StreamKind,

    /// The raw stream.
    #[structopt(parse(from_os_str))]
    file: PathBuf,
}

#[derive(StructOpt, Debug)]
pub(super) struct IdsetSubcommand {
    #[structopt(flatten)]
    common: CommonOptions,

    /// Replicas are identified by 16-byte GUIDs rather than 2-byte ids, as
    /// in the synchronisation state properties.
    #[structopt(long)]
    replguid: bool,

    /// The raw IDSET.
    #[structopt(parse(from_os_str))]
    file: PathBuf,
}

pub fn main() {
    let cmd = match Command::from_iter_safe(std::env::args_os()) {
        Ok(cmd) => cmd,
        Err(e) if is_informational(&e) => {
            println!("{}", e.message);
            return;
        }
        // Not clap's own exit(), which would use status 1
        Err(e) => die!(EX_USAGE, "{}", e.message),
    };

    match cmd {
        Command::Dump(cmd) => decode_and_print(cmd, false),
        Command::Summary(cmd) => decode_and_print(cmd, true),
        Command::Idset(cmd) => idset(cmd),
    }
}

/// Whether clap stopped to show `--help` or `--version` rather than because
/// the command line was wrong.
fn is_informational(e: &clap::Error) -> bool {
    matches!(
        e.kind,
        clap::ErrorKind::HelpDisplayed | clap::ErrorKind::VersionDisplayed
    )
}

fn load_config(common: &CommonOptions) -> DecodeConfig {
    let config = match common.config {
        None => DecodeConfig::default(),
        Some(ref path) => match DecodeConfig::load(path) {
            Ok(config) => config,
            Err(e) => {
                die!(EX_CONFIG, "Error in config file '{}': {}", path.display(), e)
            }
        },
    };

    init_logging(common, &config);
    config
}

fn init_logging(common: &CommonOptions, config: &DecodeConfig) {
    if let Some(ref log_config_file) = common.log_config {
        if let Err(e) = log4rs::init_file(
            log_config_file,
            log4rs::config::Deserializers::default(),
        ) {
            die!(
                EX_CONFIG,
                "Error in log config '{}': {}",
                log_config_file.display(),
                e
            );
        }
        return;
    }

    let level = config.log.level_filter();
    let stderr = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new(
            "{d(%H:%M:%S%.3f)} [{l}][{t}] {m}{n}",
        )))
        .build();
    let log_config = Config::builder()
        .appender(
            Appender::builder()
                .filter(Box::new(ThresholdFilter::new(level)))
                .build("stderr", Box::new(stderr)),
        )
        .build(Root::builder().appender("stderr").build(level))
        .expect("Failed to build logging configuration");
    log4rs::init_config(log_config).expect("Failed to initialise logging");
}

fn read_input(path: &Path) -> Vec<u8> {
    match fs::read(path) {
        Ok(data) => data,
        Err(e) => die!(EX_NOINPUT, "Failed to read '{}': {}", path.display(), e),
    }
}

fn decode_and_print(cmd: DecodeSubcommand, summary: bool) {
    let config = load_config(&cmd.common);
    let data = read_input(&cmd.file);
    info!(
        "Decoding {} bytes from '{}' as {}",
        data.len(),
        cmd.file.display(),
        cmd.kind
    );

    let (decoded, captured) = match decode(cmd.kind, &data, config.stream) {
        Ok(result) => result,
        Err(e) => die!(EX_DATAERR, "{}: {}", cmd.file.display(), e),
    };

    if let Some(captured) = captured {
        info!("{} property lists decoded", captured.len());
    }

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let result = if summary {
        super::summary::print(&mut out, &decoded)
    } else {
        super::dump::Dumper::new(&mut out).decoded(&decoded)
    };

    match result {
        Ok(()) => debug!("Done"),
        Err(super::PrintError::Io(e)) => {
            die!(EX_IOERR, "Failed to write output: {}", e)
        }
        Err(super::PrintError::Decode(e)) => {
            die!(EX_DATAERR, "{}: {}", cmd.file.display(), e)
        }
    }
}

fn idset(cmd: IdsetSubcommand) {
    load_config(&cmd.common);
    let data = read_input(&cmd.file);
    let idset = if cmd.replguid {
        IdSet::decode_replguid(&data)
    } else {
        IdSet::decode_replid(&data)
    };

    let idset = match idset {
        Ok(idset) => idset,
        Err(e) => die!(EX_DATAERR, "{}: {}", cmd.file.display(), e),
    };

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    if let Err(e) = super::dump::Dumper::new(&mut out).idset(&idset) {
        die!(EX_IOERR, "Failed to write output: {}", e)
    }
}

impl FromStr for StreamKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, String> {
        StreamKind::all()
            .iter()
            .copied()
            .find(|k| k.name() == s)
            .ok_or_else(|| format!("Unknown stream kind '{}'", s))
    }
}

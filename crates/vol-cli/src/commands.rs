use std::cmp::Ordering;
use std::path::Path;

use anyhow::Context;
use colored::Colorize;
use serde::Serialize;
use vol_api::{Handle, InfoFields, Session, Traversal};
use vol_connector::Location;
use vol_native::NativeConfig;
use vol_token::{compare, TokenCodec};
use vol_types::{Address, AddressWidth, ObjectType, Token};

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let format = cli.format;
    match cli.command {
        Command::Token(TokenCommand::Encode(args)) => cmd_encode(args, format),
        Command::Token(TokenCommand::Decode(args)) => cmd_decode(args, format),
        Command::Token(TokenCommand::Compare(args)) => cmd_compare(args, format),
        Command::Walk(args) => {
            let config = load_config(cli.config.as_deref())?;
            cmd_walk(args, config, format)
        }
    }
}

/// Read native settings from `path`, or use the defaults.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<NativeConfig> {
    let Some(path) = path else {
        return Ok(NativeConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let config = NativeConfig::from_toml_str(&text)
        .with_context(|| format!("loading config {}", path.display()))?;
    tracing::debug!(path = %path.display(), "loaded native config");
    Ok(config)
}

// ---- token ----

#[derive(Serialize)]
struct EncodedToken {
    addr: u64,
    width: usize,
    token: String,
    text: String,
}

fn encode(addr: u64, width: usize) -> anyhow::Result<EncodedToken> {
    let width = AddressWidth::new(width)?;
    let address = Address::new(addr);
    anyhow::ensure!(
        width.fits(address),
        "address {addr} does not fit in {width}-byte addresses"
    );
    let codec = TokenCodec::new(width);
    let token = codec.encode(address);
    Ok(EncodedToken {
        addr,
        width: width.bytes(),
        token: token.to_hex(),
        text: codec.to_text(&token),
    })
}

fn decode(hex: &str, width: usize) -> anyhow::Result<Address> {
    let codec = TokenCodec::new(AddressWidth::new(width)?);
    let token = Token::from_hex(hex)?;
    Ok(codec.decode(&token))
}

fn ordering_label(ordering: Ordering) -> &'static str {
    match ordering {
        Ordering::Less => "lt",
        Ordering::Equal => "eq",
        Ordering::Greater => "gt",
    }
}

fn cmd_encode(args: EncodeArgs, format: OutputFormat) -> anyhow::Result<()> {
    let encoded = encode(args.addr, args.width)?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&encoded)?),
        OutputFormat::Text => {
            println!("{} {}", "token:".bold(), encoded.token.cyan());
            println!("{} {}", "text: ".bold(), encoded.text);
        }
    }
    Ok(())
}

fn cmd_decode(args: DecodeArgs, format: OutputFormat) -> anyhow::Result<()> {
    let addr = decode(&args.token, args.width)?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::json!({ "addr": addr.get() })),
        OutputFormat::Text => println!("{} {}", "address:".bold(), addr.to_string().yellow()),
    }
    Ok(())
}

fn cmd_compare(args: CompareArgs, format: OutputFormat) -> anyhow::Result<()> {
    let left = Token::from_hex(&args.left).context("left token")?;
    let right = Token::from_hex(&args.right).context("right token")?;
    let label = ordering_label(compare(&left, &right));
    match format {
        OutputFormat::Json => println!("{}", serde_json::json!({ "ordering": label })),
        OutputFormat::Text => println!("{}", label.bold()),
    }
    Ok(())
}

// ---- walk ----

/// One object reached by a current-generation walk.
#[derive(Debug, Serialize)]
pub struct WalkRow {
    pub path: String,
    pub obj_type: ObjectType,
    pub token: String,
    pub rc: u32,
    pub num_attrs: u64,
}

/// One object reached by a legacy walk.
#[derive(Debug, Serialize)]
pub struct LegacyRow {
    pub path: String,
    pub obj_type: ObjectType,
    pub addr: u64,
    pub rc: u32,
    pub nmesgs: u32,
    pub hdr_total: u64,
}

/// Populate a fresh container:
///
/// ```text
/// /            attribute "title"
/// /data        group
/// /data/raw    dataset, also hard-linked as /latest
/// /meta        group holding dataset "notes"
/// /alias       soft link to /data
/// ```
pub fn build_demo(session: &Session) -> anyhow::Result<Handle> {
    let vol = session.vol();
    let file = vol.file_create(session.native(), "demo.vol", None, None)?;

    let title = vol.attr_create(file, Location::BySelf, "title")?;
    vol.attr_write(title, b"demo container")?;
    vol.close(title)?;

    let data = vol.group_create(file, "data", None)?;
    let raw = vol.dataset_create(data, "raw", None)?;
    vol.dataset_write(raw, &[0u8; 64])?;
    vol.close(raw)?;
    vol.close(data)?;

    let meta = vol.group_create(file, "meta", None)?;
    let notes = vol.dataset_create(meta, "notes", None)?;
    vol.dataset_write(notes, b"walk me")?;
    vol.close(notes)?;
    vol.close(meta)?;

    vol.link_create_hard(
        file,
        Location::by_name("data/raw"),
        file,
        Location::by_name("latest"),
    )?;
    vol.link_create_soft("/data", file, Location::by_name("alias"))?;
    tracing::info!(%file, "built demo container");
    Ok(file)
}

pub fn walk_current(
    session: &Session,
    file: Handle,
    traversal: Traversal,
) -> anyhow::Result<Vec<WalkRow>> {
    let mut seen = Vec::new();
    session.api().visit(file, traversal, InfoFields::COMMON, |_, path, info| {
        seen.push((path.to_string(), *info));
        0
    })?;
    seen.into_iter()
        .map(|(path, info)| -> anyhow::Result<WalkRow> {
            let token = session.api().token_to_str(file, &info.token)?;
            Ok(WalkRow {
                path,
                obj_type: info.obj_type,
                token,
                rc: info.rc,
                num_attrs: info.num_attrs,
            })
        })
        .collect()
}

pub fn walk_legacy(
    session: &Session,
    file: Handle,
    traversal: Traversal,
) -> anyhow::Result<Vec<LegacyRow>> {
    let mut rows = Vec::new();
    session.api().visit1(file, traversal, |_, path, info| {
        rows.push(LegacyRow {
            path: path.to_string(),
            obj_type: info.obj_type,
            addr: info.addr.get(),
            rc: info.rc,
            nmesgs: info.hdr.nmesgs,
            hdr_total: info.hdr.space.total,
        });
        0
    })?;
    Ok(rows)
}

fn cmd_walk(args: WalkArgs, config: NativeConfig, format: OutputFormat) -> anyhow::Result<()> {
    let session = Session::new(config)?;
    let file = build_demo(&session)?;
    let traversal = args.traversal();

    if args.legacy {
        let rows = walk_legacy(&session, file, traversal)?;
        match format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&rows)?),
            OutputFormat::Text => {
                for row in &rows {
                    println!(
                        "{:<12} {:<14} addr {:<8} rc {} hdr {} msgs / {} bytes",
                        row.path.bold(),
                        format!("{:?}", row.obj_type).cyan(),
                        row.addr.to_string().yellow(),
                        row.rc,
                        row.nmesgs,
                        row.hdr_total,
                    );
                }
            }
        }
    } else {
        let rows = walk_current(&session, file, traversal)?;
        match format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&rows)?),
            OutputFormat::Text => {
                for row in &rows {
                    println!(
                        "{:<12} {:<14} token {:<8} rc {} attrs {}",
                        row.path.bold(),
                        format!("{:?}", row.obj_type).cyan(),
                        row.token.yellow(),
                        row.rc,
                        row.num_attrs,
                    );
                }
            }
        }
    }

    session.vol().close(file)?;
    if format == OutputFormat::Text {
        println!("{} Walk complete.", "✓".green().bold());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use vol_api::{IndexType, IterOrder};

    use super::*;

    fn demo() -> (Session, Handle) {
        let session = Session::new(NativeConfig::default()).unwrap();
        let file = build_demo(&session).unwrap();
        (session, file)
    }

    // ---- config ----

    #[test]
    fn default_config_without_path() {
        assert_eq!(load_config(None).unwrap(), NativeConfig::default());
    }

    #[test]
    fn config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "track_creation_order = true").unwrap();
        writeln!(file, "superblock_size = 512").unwrap();
        let config = load_config(Some(file.path())).unwrap();
        assert!(config.track_creation_order);
        assert_eq!(config.superblock_size, 512);
        assert_eq!(config.max_soft_link_traversals, 16);
    }

    #[test]
    fn invalid_config_reports_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "superblock_size = 0").unwrap();
        let err = load_config(Some(file.path())).unwrap_err();
        assert!(err.to_string().contains("loading config"));
    }

    #[test]
    fn missing_config_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_config(Some(&dir.path().join("absent.toml"))).is_err());
    }

    // ---- token ----

    #[test]
    fn encode_then_decode() {
        let encoded = encode(4096, 4).unwrap();
        assert_eq!(encoded.text, "4096");
        assert_eq!(encoded.token.len(), 32);
        assert_eq!(decode(&encoded.token, 4).unwrap(), Address::new(4096));
    }

    #[test]
    fn encode_rejects_oversized_address() {
        assert!(encode(1 << 40, 4).is_err());
        assert!(encode(1, 9).is_err());
    }

    #[test]
    fn decode_rejects_short_hex() {
        assert!(decode("00ff", 8).is_err());
    }

    #[test]
    fn ordering_labels() {
        let low = encode(1, 8).unwrap().token;
        let high = encode(2, 8).unwrap().token;
        let low = Token::from_hex(&low).unwrap();
        let high = Token::from_hex(&high).unwrap();
        assert_eq!(ordering_label(compare(&low, &high)), "lt");
        assert_eq!(ordering_label(compare(&high, &high)), "eq");
        assert_eq!(ordering_label(compare(&high, &low)), "gt");
    }

    // ---- walk ----

    #[test]
    fn current_walk_visits_shared_dataset_once() {
        let (session, file) = demo();
        let rows = walk_current(&session, file, Traversal::by_name()).unwrap();
        let paths: Vec<_> = rows.iter().map(|r| r.path.as_str()).collect();
        assert_eq!(paths, [".", "data", "data/raw", "meta", "meta/notes"]);
        let raw = rows.iter().find(|r| r.path == "data/raw").unwrap();
        assert_eq!(raw.rc, 2);
        assert_eq!(rows[0].num_attrs, 1);
    }

    #[test]
    fn decreasing_walk_reaches_dataset_through_latest() {
        let (session, file) = demo();
        let rows = walk_current(
            &session,
            file,
            Traversal::new(IndexType::Name, IterOrder::Decreasing),
        )
        .unwrap();
        let paths: Vec<_> = rows.iter().map(|r| r.path.as_str()).collect();
        assert_eq!(paths, [".", "meta", "meta/notes", "latest", "data"]);
    }

    #[test]
    fn legacy_walk_addresses_match_tokens() {
        let (session, file) = demo();
        let current = walk_current(&session, file, Traversal::by_name()).unwrap();
        let legacy = walk_legacy(&session, file, Traversal::by_name()).unwrap();
        assert_eq!(current.len(), legacy.len());
        for (c, l) in current.iter().zip(&legacy) {
            assert_eq!(c.path, l.path);
            assert_eq!(c.token, l.addr.to_string());
            assert!(l.nmesgs > 0);
        }
    }

    #[test]
    fn walk_rows_serialize() {
        let (session, file) = demo();
        let rows = walk_legacy(&session, file, Traversal::by_name()).unwrap();
        let json = serde_json::to_value(&rows).unwrap();
        assert_eq!(json[0]["path"], ".");
        assert_eq!(json[0]["obj_type"], "Group");
    }
}

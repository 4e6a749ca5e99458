//! Command handlers: turn parsed arguments into engine calls and print results.

use anyhow::{Context, Result, bail};
use owo_colors::OwoColorize;
use std::fs;
use std::path::PathBuf;
use tabled::{Table, Tabled, settings::Style};

use crate::cli::{AppContext, CodecArgs, LsArgs, RmArgs, TransferArgs};
use crate::core::collection::Collection;
use crate::core::prompt::TerminalPrompt;
use crate::core::reconcile::{self, Action, Listing, Report};
use crate::infra::lzstring;

/// Parse a user argument, expanding a leading `~`
fn open(arg: &str) -> Result<Collection> {
    Collection::parse(&shellexpand::tilde(arg))
}

pub fn ls(args: LsArgs, ctx: &AppContext) -> Result<()> {
    for (i, arg) in args.paths.iter().enumerate() {
        let mut coll = open(arg)?;
        let listing = reconcile::list(&mut coll, &ctx.settings)?;
        if i > 0 {
            println!();
        }
        print!("{}", render_listing(&listing, ctx.no_color));
    }
    Ok(())
}

#[derive(Tabled)]
struct ListingLine {
    #[tabled(rename = "id")]
    id: String,
    #[tabled(rename = "savetime")]
    saved_at: String,
    #[tabled(rename = "playtime")]
    playtime: String,
    #[tabled(rename = "char")]
    characters: usize,
    #[tabled(rename = "gold")]
    gold: i64,
    #[tabled(rename = "map")]
    map: String,
}

/// Header line plus an aligned table, newline-terminated
pub fn render_listing(listing: &Listing, no_color: bool) -> String {
    let mut out = if no_color {
        listing.location.clone()
    } else {
        listing.location.bold().to_string()
    };
    if let Some(title) = &listing.title {
        out.push(' ');
        out.push_str(title);
    }
    out.push('\n');

    let lines: Vec<ListingLine> = listing
        .rows
        .iter()
        .map(|r| ListingLine {
            id: format!("#{}", r.id),
            saved_at: r
                .summary
                .saved_at()
                .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_default(),
            playtime: format!("[{}]", r.summary.playtime_minutes()),
            characters: r.summary.characters.len(),
            gold: r.summary.gold,
            map: r.summary.map_name.clone(),
        })
        .collect();

    let mut table = Table::new(lines);
    table.with(Style::blank());
    out.push_str(&table.to_string());
    out.push('\n');
    out
}

pub fn cp(args: TransferArgs, ctx: &AppContext) -> Result<()> {
    let (mut sources, mut dest) = split_transfer(&args.paths)?;
    let report = reconcile::copy(&mut sources, &mut dest, &ctx.settings, &mut TerminalPrompt)?;
    print_report(&report, ctx);
    Ok(())
}

pub fn mv(args: TransferArgs, ctx: &AppContext) -> Result<()> {
    let (mut sources, mut dest) = split_transfer(&args.paths)?;
    let report =
        reconcile::move_records(&mut sources, &mut dest, &ctx.settings, &mut TerminalPrompt)?;
    print_report(&report, ctx);
    Ok(())
}

/// Last argument is the destination. With a single source, a destination
/// like "#10" means the source's own collection.
fn split_transfer(paths: &[String]) -> Result<(Vec<Collection>, Collection)> {
    let Some((dest_arg, src_args)) = paths.split_last() else {
        bail!("please set source filenames and a destination filename and/or #id");
    };
    if src_args.is_empty() {
        bail!("please set source filenames and a destination filename and/or #id");
    }

    let sources = src_args.iter().map(|a| open(a)).collect::<Result<Vec<_>>>()?;

    let mut dest_sel = crate::core::selector::Selector::parse(&shellexpand::tilde(dest_arg))?;
    if dest_sel.path.is_empty() && sources.len() == 1 {
        dest_sel.path = sources[0].selector().path.clone();
    }

    Ok((sources, Collection::new(dest_sel)))
}

pub fn rm(args: RmArgs, ctx: &AppContext) -> Result<()> {
    for arg in &args.paths {
        let mut coll = open(arg)?;
        if !coll.selector().has_marker {
            bail!("refusing to remove every save in '{arg}'; give ids like '{arg}#1,3' or '{arg}#*'");
        }
        let report = reconcile::remove(&mut coll, &ctx.settings)?;
        print_report(&report, ctx);
    }
    Ok(())
}

fn print_report(report: &Report, ctx: &AppContext) {
    if !ctx.settings.verbose {
        return;
    }
    for action in &report.actions {
        match action {
            Action::Kept { .. } if !ctx.no_color => println!("{}", action.yellow()),
            _ => println!("{action}"),
        }
    }
}

pub fn decode(args: CodecArgs) -> Result<()> {
    let text = lzstring::read_lzstring_file(&args.src)?;
    emit(args.dest, &text)
}

pub fn encode(args: CodecArgs) -> Result<()> {
    let raw = fs::read_to_string(&args.src)
        .with_context(|| format!("Failed to read {}", args.src.display()))?;
    emit(args.dest, &lzstring::compress(&raw))
}

fn emit(dest: Option<PathBuf>, data: &str) -> Result<()> {
    match dest {
        Some(path) if path.as_os_str() != "-" => {
            fs::write(&path, data).with_context(|| format!("Failed to write {}", path.display()))
        }
        _ => {
            println!("{data}");
            Ok(())
        }
    }
}

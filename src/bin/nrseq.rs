//! nrseq : non redundant protein sets and derived identifier lists.
//!
//! nrseq cluster --fasta [-f] file --out [-o] dir \[--non-putative list\] \[--gold list\]
//!
//! - --fasta : the fasta file (possibly gzipped) of all proteins
//! - --out : directory receiving clusters.tsv, representatives.fasta, representatives.ids,
//!           member2repr.tsv, repr2members.tsv and parameters.json
//! - --non-putative : list of non putative names.
//!   If absent names ending with the putative suffix (P) are putative.
//! - --gold : list of gold standard names
//! - --prefix, --width, --column, --suffix, --no-verify : see ClusterParams
//!
//! nrseq select --clusters file --flags list \[--flagged-name\] --out file
//!
//!  representatives of clusters having a member in the flag list.
//!  With --flagged-name, the preferred flagged member of each such cluster.
//!
//! nrseq filter --base list --filter list --out file
//!
//! nrseq join --keys list --dict file \[--lenient\] --out file
//!
//! nrseq rename --ids list --from prefix --to prefix --out file
//!
//! Logging is driven by RUST_LOG.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};

// for logging (debug mostly, switched at compile time in cargo.toml)
use env_logger::Builder;

// our crate
use nrseq::cluster::{ClusterBuilder, ClusterTable};
use nrseq::idset::IdentifierSet;
use nrseq::join::{self, JoinMode};
use nrseq::kvdict::KeyValueDict;
use nrseq::utils::*;

// install a logger facility
pub fn init_log() -> u64 {
    Builder::from_default_env().init();
    log::info!("logger initialized");
    1
}

fn get_path(matches: &ArgMatches, name: &str) -> Result<PathBuf> {
    matches
        .get_one::<PathBuf>(name)
        .cloned()
        .with_context(|| format!("argument --{} is mandatory", name))
}

fn load_set(path: &Path) -> Result<IdentifierSet> {
    IdentifierSet::from_path(path)
        .with_context(|| format!("cannot load identifier list {:?}", path))
}

#[doc(hidden)]
fn parse_cluster(matches: &ArgMatches) -> Result<()> {
    log::debug!("in parse_cluster");
    //
    let fasta = get_path(matches, "fasta")?;
    let outdir = get_path(matches, "out")?;
    let mut params = ClusterParams::default();
    if let Some(prefix) = matches.get_one::<String>("prefix") {
        params.cluster_prefix = prefix.clone();
    }
    if let Some(width) = matches.get_one::<usize>("width") {
        params.sequence_width = *width;
    }
    if let Some(column) = matches.get_one::<String>("column") {
        params.column_name = column.clone();
    }
    if let Some(suffix) = matches.get_one::<String>("suffix") {
        params.putative_suffix = suffix.clone();
    }
    params.verify_sequences = !matches.get_flag("no_verify");
    log::info!("cluster parameters : {:?}", params);
    //
    let non_putative_path = matches.get_one::<PathBuf>("non_putative").map(PathBuf::as_path);
    let non_putative =
        load_optional_set(non_putative_path).context("cannot load non putative list")?;
    if non_putative.is_none() {
        log::info!("no non putative list, putative names end with {:?}", params.putative_suffix);
    }
    let gold_path = matches.get_one::<PathBuf>("gold").map(PathBuf::as_path);
    let gold_standard = load_optional_set(gold_path).context("cannot load gold standard list")?;
    let flag_sources = FlagSources::new(non_putative, gold_standard);
    //
    let records = read_records_from_path(&fasta, &flag_sources, &params)
        .with_context(|| format!("cannot read records from {:?}", fasta))?;
    let table = ClusterBuilder::new(params.clone()).build(&records)?;
    //
    fs::create_dir_all(&outdir).with_context(|| format!("cannot create directory {:?}", outdir))?;
    table.dump(&outdir.join("clusters.tsv"))?;
    table.dump_representatives_fasta(&outdir.join("representatives.fasta"), params.sequence_width)?;
    table.representatives().dump(&outdir.join("representatives.ids"))?;
    table.member_to_representative()?.dump(&outdir.join("member2repr.tsv"))?;
    table.representative_to_members().dump(&outdir.join("repr2members.tsv"))?;
    params.dump_json(&outdir)?;
    //
    println!(
        "nb records : {}, nb clusters : {}, results in {:?}",
        records.len(),
        table.len(),
        outdir
    );
    Ok(())
} // end of parse_cluster

/// warns if the table does not look built with the parameters dumped beside it
fn check_params(table: &ClusterTable, clusters_path: &Path) {
    let dir = clusters_path.parent().unwrap_or_else(|| Path::new("."));
    if !dir.join("parameters.json").exists() {
        log::info!("no parameters.json beside {:?}, no coherence check", clusters_path);
        return;
    }
    match ClusterParams::reload_json(dir) {
        Ok(params) => {
            if params.column_name != table.get_column_name() {
                log::warn!(
                    "cluster table column {} differs from dumped parameters {}",
                    table.get_column_name(),
                    params.column_name
                );
            }
            let prefix = params.cluster_prefix.as_str();
            if let Some(c) = table.iter().find(|c| !c.get_cluster_id().starts_with(prefix)) {
                log::warn!(
                    "cluster id {} does not have dumped prefix {}",
                    c.get_cluster_id(),
                    prefix
                );
            }
        }
        Err(e) => log::warn!("could not reload parameters : {}", e),
    }
} // end of check_params

#[doc(hidden)]
fn parse_select(matches: &ArgMatches) -> Result<()> {
    let clusters = get_path(matches, "clusters")?;
    let flags = get_path(matches, "flags")?;
    let out = get_path(matches, "out")?;
    let table = ClusterTable::from_path(&clusters)
        .with_context(|| format!("cannot reload cluster table {:?}", clusters))?;
    check_params(&table, &clusters);
    let flag_set = load_set(&flags)?;
    let selected = if matches.get_flag("flagged_name") {
        join::select_preferred_flagged(&table, &flag_set)
    } else {
        join::select_clusters_containing(&table, &flag_set)?
    };
    selected.dump(&out)?;
    println!("selected {} clusters of {}", selected.len(), table.len());
    Ok(())
}

#[doc(hidden)]
fn parse_filter(matches: &ArgMatches) -> Result<()> {
    let base = load_set(&get_path(matches, "base")?)?;
    let filter = load_set(&get_path(matches, "filter")?)?;
    let kept = join::filter_by_membership(&base, &filter);
    kept.dump(&get_path(matches, "out")?)?;
    println!("kept {} identifiers of {}", kept.len(), base.len());
    Ok(())
}

#[doc(hidden)]
fn parse_join(matches: &ArgMatches) -> Result<()> {
    let keys = load_set(&get_path(matches, "keys")?)?;
    let dict_path = get_path(matches, "dict")?;
    let dict = KeyValueDict::from_path(&dict_path)
        .with_context(|| format!("cannot load dictionary {:?}", dict_path))?;
    let mode = if matches.get_flag("lenient") { JoinMode::Lenient } else { JoinMode::Strict };
    let joined = join::lookup_join(&keys, &dict, mode)?;
    joined.dump(&get_path(matches, "out")?)?;
    println!("joined {} keys into {} values", keys.len(), joined.len());
    Ok(())
}

#[doc(hidden)]
fn parse_rename(matches: &ArgMatches) -> Result<()> {
    let ids = load_set(&get_path(matches, "ids")?)?;
    let from = matches.get_one::<String>("from").context("--from is mandatory")?;
    let to = matches.get_one::<String>("to").context("--to is mandatory")?;
    let renamed = join::rename(&ids, join::prefix_substitution(from, to))?;
    renamed.dump(&get_path(matches, "out")?)?;
    Ok(())
}

//============================================================================================

fn path_arg(name: &'static str, long: &'static str, help: &'static str) -> Arg {
    Arg::new(name)
        .long(long)
        .help(help)
        .required(true)
        .value_name("FILE")
        .value_parser(value_parser!(PathBuf))
}

fn main() -> Result<()> {
    let _ = init_log();

    let cluster_cmd = Command::new("cluster")
        .about("Cluster identical sequences and elect representatives")
        .arg(path_arg("fasta", "fasta", "fasta file of all proteins, may be gzipped").short('f'))
        .arg(path_arg("out", "out", "output directory").short('o').value_name("DIR"))
        .arg(
            path_arg("non_putative", "non-putative", "list of non putative names")
                .required(false),
        )
        .arg(path_arg("gold", "gold", "list of gold standard names").required(false))
        .arg(
            Arg::new("prefix")
                .long("prefix")
                .help("cluster id prefix, default nr-")
                .value_name("PREFIX"),
        )
        .arg(
            Arg::new("width")
                .short('w')
                .long("width")
                .help("sequence width of representative fasta, default 80")
                .value_name("N")
                .value_parser(value_parser!(usize)),
        )
        .arg(
            Arg::new("column")
                .long("column")
                .help("first column header, default Fingerprint")
                .value_name("NAME"),
        )
        .arg(
            Arg::new("suffix")
                .long("suffix")
                .help("putative name suffix, default P")
                .value_name("SUFFIX"),
        )
        .arg(
            Arg::new("no_verify")
                .long("no-verify")
                .help("trust fingerprints, do not compare sequences")
                .action(ArgAction::SetTrue),
        );

    let select_cmd = Command::new("select")
        .about("Representatives of clusters having a flagged member")
        .arg(path_arg("clusters", "clusters", "cluster table"))
        .arg(path_arg("flags", "flags", "list of flagged names"))
        .arg(
            Arg::new("flagged_name")
                .long("flagged-name")
                .help("report the preferred flagged member of each cluster, not its representative")
                .action(ArgAction::SetTrue),
        )
        .arg(path_arg("out", "out", "output list").short('o'));

    let filter_cmd = Command::new("filter")
        .about("Keep identifiers of a list present in another list")
        .arg(path_arg("base", "base", "list to filter"))
        .arg(path_arg("filter", "filter", "list of accepted identifiers"))
        .arg(path_arg("out", "out", "output list").short('o'));

    let join_cmd = Command::new("join")
        .about("Map a list of keys through a dictionary")
        .arg(path_arg("keys", "keys", "list of keys"))
        .arg(path_arg("dict", "dict", "two column dictionary"))
        .arg(
            Arg::new("lenient")
                .long("lenient")
                .help("omit keys absent from dictionary instead of failing")
                .action(ArgAction::SetTrue),
        )
        .arg(path_arg("out", "out", "output list").short('o'));

    let rename_cmd = Command::new("rename")
        .about("Change identifier prefix")
        .arg(path_arg("ids", "ids", "list to rename"))
        .arg(Arg::new("from").long("from").required(true).value_name("PREFIX"))
        .arg(Arg::new("to").long("to").required(true).value_name("PREFIX"))
        .arg(path_arg("out", "out", "output list").short('o'));

    //
    // the global command
    //
    let matches = Command::new("nrseq")
        .version("0.1.0")
        .about("Non redundant protein sets and derived identifier lists")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(cluster_cmd)
        .subcommand(select_cmd)
        .subcommand(filter_cmd)
        .subcommand(join_cmd)
        .subcommand(rename_cmd)
        .get_matches();

    match matches.subcommand() {
        Some(("cluster", sub)) => parse_cluster(sub),
        Some(("select", sub)) => parse_select(sub),
        Some(("filter", sub)) => parse_filter(sub),
        Some(("join", sub)) => parse_join(sub),
        Some(("rename", sub)) => parse_rename(sub),
        _ => unreachable!("subcommand is required"),
    }
} // end of main

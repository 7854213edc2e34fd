use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tilechain::{load_config, ProfileCatalog};

#[derive(Debug, Parser)]
#[command(name = "orders", about = "Chain-length profile store tool")]
struct Args {
    /// Engine config JSON (missing file = defaults)
    #[arg(long, default_value = "tilechain.json")]
    config: PathBuf,

    /// Profile store path; overrides the one in the config
    #[arg(long)]
    store: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Debug, Subcommand)]
enum Cmd {
    /// Write a fresh catalog with every permutation of the base order
    Generate {
        /// Comma-separated base order, e.g. 4,5,3,6,2,7,8,9
        #[arg(long)]
        base: Option<String>,
        /// Keep the stats of an existing store
        #[arg(long, default_value_t = false)]
        keep_stats: bool,
    },
    /// Make the best-scoring profile active
    Reindex,
    /// Print the active profile and the top entries by composite score
    Show {
        #[arg(long, default_value_t = 10)]
        top: usize,
    },
}

fn parse_base(s: &str) -> Result<Vec<u8>, String> {
    let mut out = Vec::new();
    for tok in s.split(',') {
        let tok = tok.trim();
        if tok.is_empty() {
            continue;
        }
        let n: u8 = tok.parse().map_err(|e| format!("bad length '{tok}': {e}"))?;
        if n < 2 {
            return Err(format!("chain length {n} is below 2"));
        }
        out.push(n);
    }
    if out.is_empty() {
        return Err("empty base order".into());
    }
    Ok(out)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = load_config(&args.config)?;
    let path = args.store.unwrap_or(config.paths.profiles.clone());

    match args.cmd {
        Cmd::Generate { base, keep_stats } => {
            let base = match base {
                Some(s) => parse_base(&s)?,
                None => config.profiles.base_lengths.clone(),
            };
            let mut cat = ProfileCatalog::generate(&base);
            if keep_stats {
                let old = ProfileCatalog::load(&path, &base);
                cat.feature_weights = old.feature_weights;
                cat.session = old.session.clone();
                if old.orders == cat.orders {
                    cat.stats = old.stats;
                    cat.current_index = old.current_index;
                } else {
                    eprintln!("[orders] existing store has a different catalog, stats dropped");
                }
            }
            cat.save(&path)?;
            println!("[orders] wrote {} orders of {:?} to {}", cat.len(), base, path.display());
        }
        Cmd::Reindex => {
            let mut cat = ProfileCatalog::load(&path, &config.profiles.base_lengths);
            let before = cat.current_index;
            let best = cat.recommend_profile();
            cat.select(best);
            cat.save(&path)?;
            println!(
                "[orders] active profile #{before} -> #{} {:?} (composite={:.4})",
                cat.current_index,
                cat.active_order(),
                cat.stats(cat.current_index).composite()
            );
        }
        Cmd::Show { top } => {
            let cat = ProfileCatalog::load(&path, &config.profiles.base_lengths);
            println!("[orders] {} orders, active #{} {:?}", cat.len(), cat.current_index, cat.active_order());
            let sess = &cat.session;
            println!(
                "[orders] session: games={} wins={} avg_score={:.1} avg_moves={:.1} max_score={:.0} max_tile={}",
                sess.total_games,
                sess.total_wins,
                sess.avg_score(),
                sess.avg_moves(),
                sess.max_score,
                sess.max_tile
            );
            let w = cat.feature_weights;
            println!(
                "[orders] pressure weights: fullness={:.3} few_merges={:.3} entropy={:.3} corner={:.3}",
                w.fullness, w.few_merges, w.entropy, w.corner
            );
            let mut ranked: Vec<(usize, f64)> = cat
                .stats
                .iter()
                .filter(|(_, s)| s.games > 0)
                .map(|(&i, s)| (i, s.composite()))
                .collect();
            ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal).then(a.0.cmp(&b.0)));
            if ranked.is_empty() {
                println!("  (no games recorded)");
            }
            for (i, c) in ranked.into_iter().take(top) {
                let s = cat.stats(i);
                println!(
                    "  #{i:<6} {:?} games={} avg_score={:.1} win_rate={:.2} composite={c:.4}",
                    cat.order(i).unwrap_or(&[]),
                    s.games,
                    s.avg_score(),
                    s.win_rate()
                );
            }
        }
    }
    Ok(())
}

//! Output formatting utilities for CLI.

use std::fmt::Write as _;

use dicewalk::game::UpgradeKind;
use dicewalk::sim::{upgrade_breakdown, SimResult};
use serde::Serialize;

/// JSON-serializable session result.
#[derive(Debug, Serialize)]
pub(super) struct JsonSimResult {
    /// Random seed used.
    seed: u64,
    /// Simulated seconds.
    elapsed: f64,
    /// Walks finished.
    turns_completed: u32,
    /// Rolls thrown, bonus rolls included.
    rolls: u32,
    /// Rolls that were doubles.
    doubles: u32,
    /// Bonus rolls lost to low stamina.
    bonus_forfeited: u32,
    /// Nodes stepped on.
    nodes_visited: u64,
    /// Gold picked up from nodes.
    gold_collected: u64,
    /// Gold left.
    final_gold: u32,
    /// Stamina left and capacity.
    stamina: [u32; 2],
    /// Enemies defeated.
    kills: u32,
    /// Final hero stats.
    stats: JsonStats,
    /// Upgrade counts per stat.
    upgrades: Vec<JsonUpgradeCount>,
}

/// JSON-serializable hero stats.
#[derive(Debug, Serialize)]
pub(super) struct JsonStats {
    strength: i32,
    intelligence: i32,
    willpower: i32,
    dexterity: i32,
    movement_speed: f64,
}

/// JSON-serializable upgrade count.
#[derive(Debug, Serialize)]
pub(super) struct JsonUpgradeCount {
    /// Upgraded stat.
    stat: UpgradeKind,
    /// Times bought.
    count: u64,
}

impl JsonSimResult {
    /// Create from a `SimResult`.
    pub(super) fn from_sim_result(result: &SimResult) -> Self {
        Self {
            seed: result.seed,
            elapsed: result.elapsed,
            turns_completed: result.tally.turns_completed,
            rolls: result.tally.rolls,
            doubles: result.tally.doubles,
            bonus_forfeited: result.tally.bonus_forfeited,
            nodes_visited: result.tally.nodes_visited,
            gold_collected: result.tally.gold_collected,
            final_gold: result.final_gold,
            stamina: [result.final_stamina, result.final_stamina_max],
            kills: result.kills,
            stats: JsonStats {
                strength: result.stats.strength,
                intelligence: result.stats.intelligence,
                willpower: result.stats.willpower,
                dexterity: result.stats.dexterity,
                movement_speed: result.stats.movement_speed,
            },
            upgrades: upgrade_breakdown(result)
                .into_iter()
                .map(|(stat, count)| JsonUpgradeCount {
                    stat,
                    count: u64::from(count),
                })
                .collect(),
        }
    }
}

/// Format a session result as human-readable text.
pub(super) fn format_text(result: &SimResult) -> String {
    let mut output = String::new();
    let tally = &result.tally;

    let _ = writeln!(output, "Session Result (seed: {})", result.seed);
    let _ = writeln!(output, "  Time:      {:.1}s", result.elapsed);
    let _ = writeln!(
        output,
        "  Turns:     {} ({} rolls, {} doubles, {} bonus forfeited)",
        tally.turns_completed, tally.rolls, tally.doubles, tally.bonus_forfeited
    );
    let _ = writeln!(output, "  Nodes:     {}", tally.nodes_visited);
    let _ = writeln!(
        output,
        "  Gold:      {} collected, {} left",
        tally.gold_collected, result.final_gold
    );
    let _ = writeln!(
        output,
        "  Stamina:   {}/{}",
        result.final_stamina, result.final_stamina_max
    );
    let _ = writeln!(
        output,
        "  Enemies:   {} spawned, {} defeated",
        tally.enemies_spawned, result.kills
    );
    output.push('\n');

    let stats = &result.stats;
    output.push_str("Hero:\n");
    let _ = writeln!(
        output,
        "  STR {}  INT {}  WIL {}  DEX {}  Speed {:.2}",
        stats.strength, stats.intelligence, stats.willpower, stats.dexterity, stats.movement_speed
    );
    output.push('\n');

    let _ = writeln!(output, "Upgrades ({}):", tally.upgrades);
    for (kind, count) in upgrade_breakdown(result) {
        let label = format!("{kind}:");
        let _ = writeln!(output, "  {label:<17} {count}");
    }

    output
}

/// Batch statistics for aggregated results.
#[derive(Debug, Default)]
pub(super) struct BatchStats {
    /// Sessions that ran to completion.
    pub(super) games_played: u64,
    /// Sessions that failed.
    pub(super) failures: u64,
    /// Total finished turns.
    total_turns: u64,
    /// Total rolls.
    total_rolls: u64,
    /// Total doubles.
    total_doubles: u64,
    /// Total enemies defeated.
    total_kills: u64,
    /// Total gold picked up.
    total_gold: u64,
    /// Gold sum of squares for std dev calculation.
    gold_sq_sum: f64,
    /// Upgrade counts per stat.
    upgrades: [u64; 7],
}

impl BatchStats {
    /// Create empty stats.
    pub(super) fn new() -> Self {
        Self::default()
    }

    /// Add a session result to the stats.
    pub(super) fn add_result(&mut self, result: &SimResult) {
        self.games_played += 1;
        self.total_turns += u64::from(result.tally.turns_completed);
        self.total_rolls += u64::from(result.tally.rolls);
        self.total_doubles += u64::from(result.tally.doubles);
        self.total_kills += u64::from(result.kills);
        self.total_gold += result.tally.gold_collected;
        #[allow(clippy::cast_precision_loss)]
        let gold = result.tally.gold_collected as f64;
        self.gold_sq_sum += gold * gold;
        for (slot, count) in self.upgrades.iter_mut().zip(result.upgrades_by_kind) {
            *slot += u64::from(count);
        }
    }

    /// Count a failed session.
    pub(super) fn add_failure(&mut self) {
        self.failures += 1;
    }

    /// Fold another thread's stats into these.
    pub(super) fn merge(&mut self, other: &Self) {
        self.games_played += other.games_played;
        self.failures += other.failures;
        self.total_turns += other.total_turns;
        self.total_rolls += other.total_rolls;
        self.total_doubles += other.total_doubles;
        self.total_kills += other.total_kills;
        self.total_gold += other.total_gold;
        self.gold_sq_sum += other.gold_sq_sum;
        for (slot, count) in self.upgrades.iter_mut().zip(other.upgrades) {
            *slot += count;
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn per_game(&self, total: u64) -> f64 {
        if self.games_played == 0 {
            return 0.0;
        }
        total as f64 / self.games_played as f64
    }

    /// Average finished turns per session.
    pub(super) fn avg_turns(&self) -> f64 {
        self.per_game(self.total_turns)
    }

    /// Average kills per session.
    pub(super) fn avg_kills(&self) -> f64 {
        self.per_game(self.total_kills)
    }

    /// Average gold collected per session.
    pub(super) fn avg_gold(&self) -> f64 {
        self.per_game(self.total_gold)
    }

    /// Gold collected standard deviation.
    #[allow(clippy::cast_precision_loss)]
    pub(super) fn gold_std_dev(&self) -> f64 {
        if self.games_played == 0 {
            return 0.0;
        }
        let n = self.games_played as f64;
        let mean = self.avg_gold();
        let variance = (self.gold_sq_sum / n) - (mean * mean);
        if variance < 0.0 {
            0.0
        } else {
            variance.sqrt()
        }
    }

    /// Share of rolls that were doubles (0.0-1.0).
    #[allow(clippy::cast_precision_loss)]
    pub(super) fn double_rate(&self) -> f64 {
        if self.total_rolls == 0 {
            return 0.0;
        }
        self.total_doubles as f64 / self.total_rolls as f64
    }

    /// Share of upgrades that went to `kind` (0.0-1.0).
    #[allow(clippy::cast_precision_loss)]
    pub(super) fn upgrade_share(&self, kind: UpgradeKind) -> f64 {
        let total: u64 = self.upgrades.iter().sum();
        if total == 0 {
            return 0.0;
        }
        self.upgrades[kind.index()] as f64 / total as f64
    }
}

/// JSON-serializable batch result.
#[derive(Debug, Serialize)]
pub(super) struct JsonBatchResult {
    /// Sessions completed.
    games_played: u64,
    /// Sessions failed.
    failures: u64,
    /// Average turns per session.
    avg_turns: f64,
    /// Share of rolls that were doubles.
    double_rate: f64,
    /// Average kills per session.
    avg_kills: f64,
    /// Average gold collected per session.
    avg_gold: f64,
    /// Gold collected standard deviation.
    gold_std_dev: f64,
    /// Per-stat upgrade totals.
    upgrades: Vec<JsonUpgradeCount>,
}

impl JsonBatchResult {
    /// Create from stats.
    pub(super) fn from_stats(stats: &BatchStats) -> Self {
        Self {
            games_played: stats.games_played,
            failures: stats.failures,
            avg_turns: stats.avg_turns(),
            double_rate: stats.double_rate(),
            avg_kills: stats.avg_kills(),
            avg_gold: stats.avg_gold(),
            gold_std_dev: stats.gold_std_dev(),
            upgrades: UpgradeKind::ALL
                .iter()
                .map(|&stat| JsonUpgradeCount {
                    stat,
                    count: stats.upgrades[stat.index()],
                })
                .collect(),
        }
    }
}

/// Format batch stats as human-readable text.
pub(super) fn format_batch_text(stats: &BatchStats) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "Batch Results ({} sessions)", stats.games_played);
    output.push_str("========================================\n\n");
    if stats.failures > 0 {
        let _ = writeln!(output, "Failed sessions: {}\n", stats.failures);
    }

    let _ = writeln!(output, "Average turns:       {:.1}", stats.avg_turns());
    let _ = writeln!(output, "Double rate:         {:.1}%", stats.double_rate() * 100.0);
    let _ = writeln!(output, "Average kills:       {:.2}", stats.avg_kills());
    let _ = writeln!(
        output,
        "Average gold:        {:.1} (+/- {:.1})",
        stats.avg_gold(),
        stats.gold_std_dev()
    );

    output.push_str("\nUpgrade mix:\n");
    for kind in UpgradeKind::ALL {
        let label = format!("{kind}:");
        let _ = writeln!(
            output,
            "  {label:<17} {:>8} ({:.1}%)",
            stats.upgrades[kind.index()],
            stats.upgrade_share(kind) * 100.0
        );
    }

    output
}

/// Format batch stats as CSV, one row per upgrade stat.
pub(super) fn format_batch_csv(stats: &BatchStats) -> String {
    let mut output = String::new();

    // Header
    output.push_str("stat,count,share,games,avg_turns,double_rate,avg_kills,avg_gold\n");

    // Data rows
    for kind in UpgradeKind::ALL {
        let _ = writeln!(
            output,
            "{},{},{:.4},{},{:.2},{:.4},{:.2},{:.2}",
            kind.name(),
            stats.upgrades[kind.index()],
            stats.upgrade_share(kind),
            stats.games_played,
            stats.avg_turns(),
            stats.double_rate(),
            stats.avg_kills(),
            stats.avg_gold()
        );
    }

    output
}

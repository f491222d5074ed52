//! Plain-text rendering of analysis results.

use chrono::DateTime;
use hashbrown::HashMap;

use raidlens_core::analysis::{DeathAnalysis, InterruptAnalysis};
use raidlens_core::api::{Actor, Fight, ReportOverview};
use raidlens_core::correlate::CastAnalysis;
use raidlens_types::formatting::{
    format_duration, format_fight_time, format_pct_ratio, format_thousands,
};

fn fight_header(fight: &Fight) {
    let duration_secs = (fight.duration_ms() / 1000.0) as i64;
    println!(
        "Fight: {} (Duration: {})",
        fight.name,
        format_duration(duration_secs)
    );
    if fight.kill {
        println!("Result: KILL");
    } else {
        println!("Result: WIPE ({:.1}%)", fight.fight_percentage);
    }
}

fn count_list(header: &str, entries: &[(String, u32)]) {
    if entries.is_empty() {
        return;
    }
    println!("{header}");
    for (name, count) in entries {
        println!("  {name}: {count}");
    }
}

pub fn interrupt_analysis(analysis: &InterruptAnalysis, player: Option<&str>) {
    match player {
        Some(name) => println!("=== INTERRUPT ANALYSIS: {name} ==="),
        None => println!("=== INTERRUPT ANALYSIS ==="),
    }
    fight_header(&analysis.fight);
    println!("Total interrupts: {}", analysis.total_interrupts);
    println!();

    if analysis.total_interrupts == 0 {
        match player {
            Some(name) => println!("{name} did not perform any interrupts in this fight."),
            None => println!("No interrupts occurred in this fight."),
        }
        return;
    }

    count_list("Top interrupters:", &analysis.interrupts_by_player);

    if player.is_some() {
        println!();
        println!("Interrupt timeline:");
        for record in &analysis.timeline {
            println!(
                "  [{}] {} on {} ({})",
                format_fight_time(record.fight_time_ms),
                record.ability_name,
                record.target_name,
                record.player_name,
            );
        }
    }

    println!();
    match &analysis.correlation {
        None => {
            if let Some(err) = &analysis.correlation_error {
                println!("Cast correlation unavailable: {err}");
            }
            println!("Showing interrupt abilities used instead of what was interrupted.");
            println!();
            count_list("Interrupt abilities used:", &analysis.abilities_used);
        }
        Some(correlation) if correlation.is_empty() => {
            println!("No cast correlations found; targets may not have cast interruptible abilities.");
            println!();
            count_list("Interrupt abilities used:", &analysis.abilities_used);
        }
        Some(correlation) => {
            println!("What was actually interrupted:");
            render_correlation(correlation);
        }
    }
    println!();
}

fn render_correlation(correlation: &HashMap<String, CastAnalysis>) {
    // Busiest abilities first
    let mut abilities: Vec<&CastAnalysis> = correlation.values().collect();
    abilities.sort_by(|a, b| {
        b.total_casts
            .cmp(&a.total_casts)
            .then_with(|| a.ability_name.cmp(&b.ability_name))
    });

    let mut total_stopped: i64 = 0;
    let mut total_missed: i64 = 0;

    for ability in abilities {
        total_stopped += i64::from(ability.stopped);
        total_missed += i64::from(ability.missed);
        let total = i64::from(ability.total_casts);

        println!();
        println!("=== {} ===", ability.ability_name);
        println!("Total casts: {}", ability.total_casts);
        println!(
            "Stopped:   {} ({})",
            ability.stopped,
            format_pct_ratio(i64::from(ability.stopped), total)
        );
        println!(
            "Completed: {} ({})",
            ability.missed,
            format_pct_ratio(i64::from(ability.missed), total)
        );

        if !ability.interrupted_by.is_empty() {
            let mut interrupters: Vec<(&String, &u32)> = ability.interrupted_by.iter().collect();
            interrupters.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
            println!("Interrupted by:");
            for (name, count) in interrupters {
                println!(
                    "  {}: {} ({})",
                    name,
                    count,
                    format_pct_ratio(i64::from(*count), total)
                );
            }
        }

        for stopped in &ability.stopped_casts {
            println!(
                "  [{}] {} cast interrupted by {}",
                format_fight_time(stopped.timestamp),
                stopped.caster_name,
                stopped.interrupted_by,
            );
        }
        for missed in &ability.missed_casts {
            println!(
                "  [{}] {} - cast completed",
                format_fight_time(missed.timestamp),
                missed.caster_name,
            );
        }
    }

    let total_casts = total_stopped + total_missed;
    if total_casts > 0 {
        println!();
        println!("Overall summary:");
        println!("  Interrupted: {total_stopped}");
        println!("  Completed:   {total_missed}");
        println!(
            "  Effectiveness: {}",
            format_pct_ratio(total_stopped, total_casts)
        );
    }
}

pub fn death_analysis(analysis: &DeathAnalysis, player: Option<&str>) {
    match player {
        Some(name) => println!("=== DEATH ANALYSIS: {name} ==="),
        None => println!("=== DEATH ANALYSIS ==="),
    }
    fight_header(&analysis.fight);
    println!("Deaths: {}", analysis.deaths.len());
    println!();

    if analysis.deaths.is_empty() {
        match player {
            Some(name) => println!("{name} survived the entire fight."),
            None => println!("No deaths in this fight - perfect execution."),
        }
        return;
    }

    println!("Death timeline:");
    for record in &analysis.deaths {
        println!(
            "  [{}] {} killed by {} from {}",
            format_fight_time(record.survival_ms),
            record.player_name,
            record.killing_ability,
            record.killing_source,
        );
    }

    println!();
    count_list("Top killing abilities:", &analysis.killing_abilities);

    for (index, record) in analysis.deaths.iter().enumerate() {
        let Some(window) = &record.window else {
            continue;
        };

        println!();
        println!(
            "Death #{} - survived {}",
            index + 1,
            format_fight_time(record.survival_ms)
        );

        if window.is_empty() {
            println!("  No events in window - likely instant-death or environmental mechanic.");
            continue;
        }

        for hit in &window.damage_events {
            let offset_secs = hit.ms_before_death / 1000.0;
            let label = if offset_secs >= 0.0 {
                format!("-{:.1}s", offset_secs)
            } else {
                format!("+{:.1}s", -offset_secs)
            };
            println!(
                "  {} {} damage from {} ({})",
                label,
                format_thousands(hit.amount),
                hit.source_name,
                hit.ability_name,
            );
        }
        println!(
            "  Damage in window: {} ({} hits)",
            format_thousands(window.total_damage),
            window.damage_event_count
        );
        if window.total_healing > 0 {
            println!(
                "  Healing received: {}",
                format_thousands(window.total_healing)
            );
        } else {
            println!("  No significant healing - may have been unavoidable.");
        }
        if window.defensive_cast_count > 0 {
            println!("  Defensive abilities used: {}", window.defensive_cast_count);
        } else {
            println!("  No defensives used.");
        }
    }
    println!();
}

pub fn players(overview: &ReportOverview, players: &[Actor]) {
    println!("Report: {}", overview.title);
    if let Some(start) = DateTime::from_timestamp_millis(overview.start_time as i64) {
        println!("Date:   {}", start.format("%Y-%m-%d %H:%M UTC"));
    }
    println!("Players ({}):", players.len());
    for player in players {
        match &player.server {
            Some(server) => println!("  {} ({}) - {}", player.name, player.sub_type, server),
            None => println!("  {} ({})", player.name, player.sub_type),
        }
    }
}

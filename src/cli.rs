//! The interactive menu (§4.12, C13): a small state machine that replaces
//! the original's `State`/`MainMenuState`/`MaxFlowMenuState`/... hierarchy
//! (§9) with an enum and a transition function. Each state prints its own
//! menu and reads one line from stdin; `q` returns to the parent menu.

use std::io::{self, BufRead, Write};

use tracing::warn;

use crate::analysis::{self, EssentialKind};
use crate::config::Config;
use crate::error::Error;
use crate::flow;
use crate::network::Network;
use crate::report;

/// Everything the menu loop needs: the loaded, solved network and the run's
/// configuration. Stands in for the original's process-wide `App` singleton
/// and its `Data*` (§9): an explicit context passed by reference instead of
/// global mutable state.
pub struct AppContext {
    /// The baseline network, with its max-flow already computed.
    pub net: Network,
    /// This run's configuration.
    pub config: Config,
}

/// The menu's states. `Root` is both the entry point and the state every
/// submenu returns to on `q`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum MenuState {
    Root,
    ReservoirImpact,
    StationImpact,
    PipelineImpact,
    Quit,
}

/// Drive the interactive menu to completion, reading from `stdin` and
/// writing to `stdout`. Returns once the root menu's quit option is chosen.
pub fn run_menu(ctx: &mut AppContext) {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    let mut state = MenuState::Root;
    while state != MenuState::Quit {
        print_menu(state);
        print!("Enter your choice: ");
        let _ = io::stdout().flush();
        let Some(Ok(line)) = lines.next() else {
            break;
        };
        state = transition(state, line.trim(), ctx);
    }
    println!("Exiting the program...");
}

fn print_menu(state: MenuState) {
    match state {
        MenuState::Root => {
            println!("========== MAIN MENU ==========");
            println!("   1. Find Max Water Flow");
            println!("   2. Verify Water Supply (deficits)");
            println!("   3. Load Optimization");
            println!("   4. Reservoir Impact");
            println!("   5. Pumping Station Impact");
            println!("   6. Pipeline Failure Impact");
            println!("   7. Essential Pipelines");
            println!("   q. Exit");
            println!("--------------------------------");
        }
        MenuState::ReservoirImpact => {
            println!("----- RESERVOIR IMPACT -----");
            println!("   1. Impact of a single reservoir (enter its code)");
            println!("   2. List non-essential reservoirs");
            println!("   q. Back");
        }
        MenuState::StationImpact => {
            println!("----- PUMPING STATION IMPACT -----");
            println!("   1. Impact of a single station (enter its code)");
            println!("   2. List non-essential stations");
            println!("   q. Back");
        }
        MenuState::PipelineImpact => {
            println!("----- PIPELINE IMPACT -----");
            println!("   Enter two service point codes separated by a space");
            println!("   q. Back");
        }
        MenuState::Quit => {}
    }
}

fn transition(state: MenuState, input: &str, ctx: &mut AppContext) -> MenuState {
    match state {
        MenuState::Root => match input {
            "1" => {
                handle(maxflow_report(ctx));
                MenuState::Root
            }
            "2" => {
                handle(deficit_report(ctx));
                MenuState::Root
            }
            "3" => {
                handle(load_optimization_report(ctx));
                MenuState::Root
            }
            "4" => MenuState::ReservoirImpact,
            "5" => MenuState::StationImpact,
            "6" => MenuState::PipelineImpact,
            "7" => {
                handle(essential_pipelines_report(ctx));
                MenuState::Root
            }
            "q" => MenuState::Quit,
            _ => {
                println!("Invalid choice. Please try again.");
                MenuState::Root
            }
        },
        MenuState::ReservoirImpact => match input {
            "q" => MenuState::Root,
            "2" => {
                handle(not_essential_report(ctx, EssentialKind::Reservoir, "reservoirs"));
                MenuState::ReservoirImpact
            }
            code => {
                handle(component_impact_report(ctx, "reservoir", code));
                MenuState::ReservoirImpact
            }
        },
        MenuState::StationImpact => match input {
            "q" => MenuState::Root,
            "2" => {
                handle(not_essential_report(ctx, EssentialKind::Station, "stations"));
                MenuState::StationImpact
            }
            code => {
                handle(component_impact_report(ctx, "station", code));
                MenuState::StationImpact
            }
        },
        MenuState::PipelineImpact => match input {
            "q" => MenuState::Root,
            other => {
                let mut parts = other.split_whitespace();
                match (parts.next(), parts.next()) {
                    (Some(a), Some(b)) => handle(pipeline_impact_report(ctx, a, b)),
                    _ => println!("Expected two codes separated by a space."),
                }
                MenuState::PipelineImpact
            }
        },
        MenuState::Quit => MenuState::Quit,
    }
}

/// Log and print an error from a façade call, the way every menu entry
/// reports a failed query (§7: every `Error` is logged at `warn` before
/// display).
fn handle(result: Result<(), Error>) {
    if let Err(err) = result {
        warn!(error = %err, "menu operation failed");
        println!("Error: {err}");
    }
}

fn maxflow_report(ctx: &mut AppContext) -> Result<(), Error> {
    let total = flow::maxflow(&mut ctx.net)?;
    println!("Total realised flow: {total:.2}");
    Ok(())
}

fn deficit_report(ctx: &AppContext) -> Result<(), Error> {
    let deficits = analysis::deficit_report(&ctx.net);
    for deficit in &deficits {
        println!("{}: demand {:.2}, deficit {:.2}", deficit.city, deficit.demand, deficit.deficit);
    }
    report::write_deficits(&ctx.config.report_dir(), &deficits)?;
    Ok(())
}

fn load_optimization_report(ctx: &AppContext) -> Result<(), Error> {
    let iterations = ctx.config.load_iterations_for(ctx.net.edge_count());
    let optimization = analysis::optimize_load(&ctx.net, iterations);
    println!(
        "relative slack variance: {:.4} -> {:.4}",
        optimization.before.variance_relative_slack, optimization.after.variance_relative_slack
    );
    report::write_load_optimization(&ctx.config.report_dir(), &optimization)?;
    Ok(())
}

fn component_impact_report(ctx: &AppContext, label: &str, code: &str) -> Result<(), Error> {
    let impacts = analysis::component_impact(&ctx.net, code)?;
    for impact in &impacts {
        println!("{}: {:.2} -> {:.2}", impact.city, impact.before, impact.after);
    }
    report::write_city_impacts(&ctx.config.report_dir(), label, &impacts)?;
    Ok(())
}

fn pipeline_impact_report(ctx: &AppContext, a: &str, b: &str) -> Result<(), Error> {
    let impacts = analysis::pipeline_impact(&ctx.net, a, b)?;
    for impact in &impacts {
        println!("{}: {:.2} -> {:.2}", impact.city, impact.before, impact.after);
    }
    report::write_city_impacts(&ctx.config.report_dir(), "pipeline", &impacts)?;
    Ok(())
}

fn not_essential_report(ctx: &AppContext, kind: EssentialKind, label: &str) -> Result<(), Error> {
    let survivors = analysis::not_essential(&ctx.net, kind)?;
    for code in &survivors {
        println!("{code}");
    }
    report::write_not_essential(&ctx.config.report_dir(), label, &survivors)?;
    Ok(())
}

fn essential_pipelines_report(ctx: &AppContext) -> Result<(), Error> {
    let impacts = analysis::essential_pipelines(&ctx.net)?;
    for impact in &impacts {
        for (a, b) in &impact.affecting_pipelines {
            println!("{}: {a}-{b}", impact.city);
        }
    }
    report::write_essential_pipelines(&ctx.config.report_dir(), &impacts)?;
    Ok(())
}

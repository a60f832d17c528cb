use clap::Parser;
use std::time::Instant;

use kinodynamic_pathfinding::config::{CliConfig, PlannerConfig, VehicleGeometry};
use kinodynamic_pathfinding::models::TractorTrailerModel;
use kinodynamic_pathfinding::planner::{HybridAStarPlanner, Path};
use kinodynamic_pathfinding::scenario::{self, Scenario};
use kinodynamic_pathfinding::statistics::PathStats;

fn main() {
    let cli = CliConfig::parse();

    let Some(scenario) = scenario::by_name(&cli.scenario, cli.seed, cli.num_obstacles) else {
        eprintln!(
            "Unknown scenario '{}'. Available: walled_yard, open_field, u_turn, sealed_goal, scatter",
            cli.scenario
        );
        std::process::exit(2);
    };

    let mut config = PlannerConfig::default();
    if let Some(gear_cost) = cli.gear_cost {
        config.gear_cost = gear_cost;
    }

    let planner = if cli.trailer {
        let trailer_body = VehicleGeometry::default();
        let model =
            TractorTrailerModel::new(config.vehicle, trailer_body, 0.3, 0.6).and_then(|m| {
                HybridAStarPlanner::with_model(config.clone(), Box::new(m))
            });
        match model {
            Ok(p) => p,
            Err(e) => {
                eprintln!("Planner setup failed: {e}");
                std::process::exit(1);
            }
        }
    } else {
        match HybridAStarPlanner::new(config.clone()) {
            Ok(p) => p,
            Err(e) => {
                eprintln!("Planner setup failed: {e}");
                std::process::exit(1);
            }
        }
    };

    if !cli.quiet {
        println!("Scenario: {}", scenario.name);
        println!(
            "Start: ({:.2}, {:.2}, {:.1}deg)  Goal: ({:.2}, {:.2}, {:.1}deg)",
            scenario.start.x,
            scenario.start.y,
            scenario.start.yaw.to_degrees(),
            scenario.goal.x,
            scenario.goal.y,
            scenario.goal.yaw.to_degrees()
        );
        println!("Obstacle cells: {}", scenario.ox.len());
        println!();
    }

    let t0 = Instant::now();
    let result = planner.plan(scenario.start, scenario.goal, &scenario.ox, &scenario.oy);
    let elapsed = t0.elapsed();

    match result {
        Ok(path) => {
            println!("Plan found in {elapsed:.2?}");
            println!();
            println!("{}", PathStats::of(&path));
            if !cli.no_render {
                render(&scenario, Some(&path), config.xy_resolution);
            }
        }
        Err(e) => {
            println!("Planning failed after {elapsed:.2?}: {e}");
            if !cli.no_render {
                render(&scenario, None, config.xy_resolution);
            }
            std::process::exit(1);
        }
    }
}

/// ASCII rendering of the obstacle grid with the path overlaid.
fn render(scenario: &Scenario, path: Option<&Path>, xy_resolution: f64) {
    println!("Legend: S=Start, G=Goal, #=Obstacle, *=Path, .=Free");

    let min_x = *scenario.ox.iter().min().unwrap_or(&0);
    let max_x = *scenario.ox.iter().max().unwrap_or(&0);
    let min_y = *scenario.oy.iter().min().unwrap_or(&0);
    let max_y = *scenario.oy.iter().max().unwrap_or(&0);

    let width = (max_x - min_x + 1) as usize;
    let height = (max_y - min_y + 1) as usize;
    let mut cells = vec![vec!['.'; width]; height];

    let mut mark = |x: i32, y: i32, c: char| {
        if x >= min_x && x <= max_x && y >= min_y && y <= max_y {
            cells[(y - min_y) as usize][(x - min_x) as usize] = c;
        }
    };

    for (&x, &y) in scenario.ox.iter().zip(&scenario.oy) {
        mark(x, y, '#');
    }
    if let Some(path) = path {
        for i in 0..path.len() {
            mark(
                (path.x[i] / xy_resolution).round() as i32,
                (path.y[i] / xy_resolution).round() as i32,
                '*',
            );
        }
    }
    mark(
        (scenario.start.x / xy_resolution).round() as i32,
        (scenario.start.y / xy_resolution).round() as i32,
        'S',
    );
    mark(
        (scenario.goal.x / xy_resolution).round() as i32,
        (scenario.goal.y / xy_resolution).round() as i32,
        'G',
    );

    // World y grows upward, so print the top row first.
    for row in cells.iter().rev() {
        let line: String = row.iter().collect();
        println!("{line}");
    }
    println!();
}

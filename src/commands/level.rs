use std::path::PathBuf;

use maskhunt::{GridPos, Level};

pub fn run_check(path: PathBuf, origin_x: i32, origin_y: i32) -> Result<(), String> {
    let level = Level::load(&path, GridPos::new(origin_x, origin_y)).map_err(|e| e.to_string())?;
    let grid = &level.grid;

    println!(
        "Level {}: {}x{} cells, origin {}",
        path.display(),
        grid.width(),
        grid.height(),
        grid.origin()
    );
    let counts: Vec<String> = level
        .tile_counts()
        .iter()
        .map(|(kind, count)| format!("{}={}", kind, count))
        .collect();
    println!("Tiles: {}", counts.join(" "));

    match level.player {
        Some(pos) => println!("Player start: {}", pos),
        None => println!("Player start: none"),
    }

    if level.pursuers.is_empty() {
        println!("No pursuers placed.");
    } else {
        println!("Pursuers:");
        for (pos, ability) in &level.pursuers {
            println!(" - {} at {}", ability.mask_name(), pos);
        }
    }

    if !level.collectibles.is_empty() {
        println!("Masks:");
        for (pos, ability) in &level.collectibles {
            println!(" - {} at {}", ability.mask_name(), pos);
        }
    }
    Ok(())
}

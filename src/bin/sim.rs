use battleship_arena::local::play_ai_match;
use rand::{rngs::SmallRng, SeedableRng};
use serde_json::json;

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() != 3 {
        eprintln!("Usage: {} <seed> <games>", args[0]);
        std::process::exit(1);
    }
    let seed: u64 = args[1].parse()?;
    let games: usize = args[2].parse()?;

    let mut wins = [0usize; 2];
    let mut winning_shots = Vec::with_capacity(games);
    for game in 0..games as u64 {
        let mut first = SmallRng::seed_from_u64(seed.wrapping_add(2 * game));
        let mut second = SmallRng::seed_from_u64(seed.wrapping_add(2 * game + 1));
        let result = play_ai_match(&mut first, &mut second)?;
        wins[result.winner] += 1;
        winning_shots.push(result.shots[result.winner]);
    }

    let average = if winning_shots.is_empty() {
        0.0
    } else {
        winning_shots.iter().sum::<usize>() as f64 / winning_shots.len() as f64
    };
    let result = json!({
        "games": games,
        "wins": {"first": wins[0], "second": wins[1]},
        "shots_to_win": {
            "min": winning_shots.iter().min(),
            "max": winning_shots.iter().max(),
            "avg": average,
        },
    });

    println!("{}", serde_json::to_string(&result)?);
    Ok(())
}

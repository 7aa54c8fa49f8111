use anyhow::{bail, Context, Result};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use trivia_client::protocol::{Category, CreateTrivia, Difficulty, GameMode, TurnMode};
use trivia_client::{
    ClientConfig, ConnectionStatus, SessionState, TriviaClient, DEFAULT_HOST, DEFAULT_PATH,
    DEFAULT_PORT,
};

#[derive(Parser, Debug)]
#[command(version, about = "Play a game on a trivia server", long_about = None)]
struct Args {
    /// Server host
    #[arg(long, default_value = DEFAULT_HOST)]
    host: String,

    /// Server port
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// WebSocket endpoint path
    #[arg(long, default_value = DEFAULT_PATH)]
    path: String,

    /// Display name sent to the server
    #[arg(short, long, default_value = "Player1")]
    name: String,

    /// PVE (single player) or PVP (two players, turn based)
    #[arg(short, long, default_value_t = GameMode::Pve)]
    mode: GameMode,

    /// Number of questions
    #[arg(short, long, default_value_t = 5)]
    questions: u32,

    /// Comma separated categories
    #[arg(short, long, value_delimiter = ',', default_values_t = [Category::Science, Category::History])]
    categories: Vec<Category>,

    /// EASY, MEDIUM, HARD or MIXED
    #[arg(short, long, default_value_t = Difficulty::Mixed)]
    difficulty: Difficulty,

    /// Seconds per question, 0 for no limit
    #[arg(short, long, default_value_t = 0)]
    time_limit: u32,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = ClientConfig::new(args.host, args.port, args.path);

    let client = TriviaClient::new();
    client
        .connect_to(&config)
        .await
        .with_context(|| format!("Failed to connect to {}", config.url()))?;

    client.reset_state();
    client
        .create_trivia(CreateTrivia {
            mode: args.mode,
            questions: args.questions,
            categories: args.categories,
            difficulty: args.difficulty,
            time_limit: args.time_limit,
            turn_mode: TurnMode::Timed,
            player_name: args.name,
        })
        .await
        .context("Failed to start a game")?;

    play(&client).await
}

/// Print what the server sends and forward answers typed on stdin.
async fn play(client: &TriviaClient) -> Result<()> {
    let mut state = client.state();
    let mut status = client.status();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut shown = SessionState::new();
    let mut answered: Option<String> = None;

    loop {
        tokio::select! {
            changed = state.changed() => {
                if changed.is_err() {
                    bail!("Client dropped");
                }
                let current = state.borrow_and_update().clone();
                print_changes(&shown, &current);
                shown = current;

                if shown.is_game_over() {
                    return Ok(());
                }
            }
            changed = status.changed() => {
                if changed.is_err() || *status.borrow_and_update() == ConnectionStatus::Disconnected {
                    let reason = client
                        .last_error()
                        .borrow()
                        .as_ref()
                        .map(ToString::to_string)
                        .unwrap_or_else(|| "disconnected".to_string());
                    bail!("Lost connection to server: {}", reason);
                }
            }
            line = lines.next_line() => {
                let Some(line) = line? else {
                    return Ok(());
                };
                submit(client, &shown, &mut answered, line.trim()).await;
            }
        }
    }
}

/// Send the option typed by the user, once per question.
async fn submit(
    client: &TriviaClient,
    state: &SessionState,
    answered: &mut Option<String>,
    input: &str,
) {
    let Some(question) = state.current_question() else {
        println!("No question yet.");
        return;
    };

    if answered.as_deref() == Some(question.id.as_str()) {
        println!("Already answered, wait for the next question.");
        return;
    }

    let choice = match input.parse::<usize>() {
        Ok(n) if (1..=question.options.len()).contains(&n) => n - 1,
        _ => {
            println!("Type a number between 1 and {}.", question.options.len());
            return;
        }
    };

    match client.answer(&question.id, choice).await {
        Ok(()) => *answered = Some(question.id.clone()),
        Err(e) => println!("Could not send answer: {}", e),
    }
}

fn print_changes(before: &SessionState, after: &SessionState) {
    if let Some(q) = after.current_question() {
        if before.current_question().map(|b| &b.id) != Some(&q.id) {
            println!();
            println!("Question {}/{} [{}]", q.index, q.total, q.category);
            if let Some(secs) = after.time_limit() {
                println!("({} seconds)", secs);
            }
            println!("{}", q.question);
            for (i, option) in q.options.iter().enumerate() {
                println!("  {}) {}", i + 1, option);
            }
        }
    }

    if let Some(r) = after.answer_result() {
        if before.answer_result() != Some(r) {
            let verdict = if r.correct { "Correct!" } else { "Wrong." };
            println!("{} +{} points", verdict, r.points);
            if !r.explanation.is_empty() {
                println!("{}", r.explanation);
            }
        }
    }

    if let Some(s) = after.score() {
        if before.score() != Some(s) {
            println!("Score: {} | Streak: {}", s.score, s.streak);
        }
    }

    if let Some(end) = after.game_end() {
        if before.game_end() != Some(end) {
            println!();
            match &end.winner {
                Some(winner) => println!("Game over. Winner: {}", winner),
                None => println!("Game over."),
            }
            println!(
                "Final score: {} ({} correct answers)",
                end.final_score, end.correct_answers
            );
        }
    }
}

//! Interactive console player.

use crate::render::{hex_upper, probability_table};
use fair_dice_core::protocol::validate_contribution;
use fair_dice_core::{
    Announcement, DiceSet, Die, FairDiceError, GameInteraction, GameReport, Outcome,
    ProbabilityTable, Purpose, Reveal, Side,
};
use std::io::{BufRead, Write};

/// Largest range whose values are listed one per line in a menu
const MAX_LISTED_OPTIONS: u64 = 20;

type Result<T> = std::result::Result<T, FairDiceError>;

enum Selection {
    Index(u64),
    Help,
    Exit,
    NotANumber(String),
}

/// Reads the user's choices from `input` and writes prompts to `output`
pub struct Console<In, Out> {
    input: In,
    output: Out,
    table: ProbabilityTable,
    computer_die: Option<Die>,
    user_die: Option<Die>,
}

impl<In: BufRead, Out: Write> Console<In, Out> {
    pub fn new(input: In, output: Out, table: ProbabilityTable) -> Self {
        Self {
            input,
            output,
            table,
            computer_die: None,
            user_die: None,
        }
    }

    /// Print the final comparison
    pub fn finish(&mut self, report: &GameReport) -> Result<()> {
        let line = match report.outcome {
            Outcome::UserWins => {
                format!("You win ({} > {})!", report.user_face, report.computer_face)
            }
            Outcome::ComputerWins => {
                format!("I win ({} > {})!", report.computer_face, report.user_face)
            }
            Outcome::Tie => {
                format!("It's a tie ({} = {})!", report.user_face, report.computer_face)
            }
        };
        self.say(&line)
    }

    pub fn into_output(self) -> Out {
        self.output
    }

    fn say(&mut self, text: &str) -> Result<()> {
        writeln!(self.output, "{text}").map_err(io_error)
    }

    fn read_selection(&mut self) -> Result<Selection> {
        write!(self.output, "Your selection: ").map_err(io_error)?;
        self.output.flush().map_err(io_error)?;

        let mut line = String::new();
        if self.input.read_line(&mut line).map_err(io_error)? == 0 {
            return Err(FairDiceError::Aborted);
        }
        let line = line.trim();
        if line.eq_ignore_ascii_case("x") {
            return Ok(Selection::Exit);
        }
        if line == "?" {
            return Ok(Selection::Help);
        }
        Ok(match line.parse::<u64>() {
            Ok(index) => Selection::Index(index),
            Err(_) => Selection::NotANumber(line.to_string()),
        })
    }

    /// Show a menu of `count` options until a valid index is entered
    fn menu(&mut self, count: u64, label: impl Fn(u64) -> String) -> Result<u64> {
        loop {
            if count <= MAX_LISTED_OPTIONS {
                for i in 0..count {
                    self.say(&format!("{i} - {}", label(i)))?;
                }
            } else {
                self.say(&format!("0..{} - any number in range", count - 1))?;
            }
            self.say("X - exit")?;
            self.say("? - help")?;

            match self.read_selection()? {
                Selection::Exit => return Err(FairDiceError::Aborted),
                Selection::Help => {
                    let help = probability_table(&self.table);
                    write!(self.output, "{help}").map_err(io_error)?;
                }
                Selection::NotANumber(text) => {
                    self.say(&format!("`{text}` is not a number. Enter a listed option."))?
                }
                Selection::Index(index) => match validate_contribution(index, count) {
                    Ok(_) => return Ok(index),
                    Err(e) => self.say(&e.to_string())?,
                },
            }
        }
    }
}

impl<In: BufRead, Out: Write> GameInteraction for Console<In, Out> {
    fn contribute(&mut self, purpose: Purpose, announcement: &Announcement) -> Result<u32> {
        let digest = hex_upper(&announcement.commitment);
        match purpose {
            Purpose::FirstMove => {
                self.say("Let's determine who makes the first move.")?;
                self.say(&format!(
                    "I selected a random value in the range 0..{} (HMAC={digest}).",
                    announcement.range_max()
                ))?;
                self.say("Try to guess my selection.")?;
            }
            Purpose::ComputerRoll | Purpose::UserRoll => {
                let whose = if purpose == Purpose::ComputerRoll {
                    "my"
                } else {
                    "your"
                };
                self.say(&format!("It's time for {whose} roll."))?;
                self.say(&format!(
                    "I selected a random value in the range 0..{} (HMAC={digest}).",
                    announcement.range_max()
                ))?;
                self.say(&format!("Add your number modulo {}.", announcement.range_size))?;
            }
        }
        let value = self.menu(announcement.range_size, |i| i.to_string())?;
        validate_contribution(value, announcement.range_size)
    }

    fn choose_die(
        &mut self,
        dice: &DiceSet,
        available: &[usize],
        _table: &ProbabilityTable,
    ) -> Result<usize> {
        self.say("Choose your dice:")?;
        let labels: Vec<String> = available
            .iter()
            .map(|&i| dice.get(i).map(ToString::to_string).unwrap_or_default())
            .collect();
        let position = self.menu(available.len() as u64, |i| labels[i as usize].clone())?;
        let index = available[position as usize];
        if let Some(die) = dice.get(index) {
            self.say(&format!("You choose the {die} dice."))?;
            self.user_die = Some(die.clone());
        }
        Ok(index)
    }

    fn revealed(&mut self, purpose: Purpose, reveal: &Reveal) -> Result<()> {
        let key = hex_upper(&reveal.key);
        let mut lines = match purpose {
            Purpose::FirstMove => vec![format!("My selection: {} (KEY={key}).", reveal.secret)],
            Purpose::ComputerRoll | Purpose::UserRoll => vec![
                format!("My number is {} (KEY={key}).", reveal.secret),
                format!(
                    "The fair number generation result is {} + {} = {} (mod {}).",
                    reveal.secret, reveal.contribution, reveal.result, reveal.range_size
                ),
            ],
        };
        let die = match purpose {
            Purpose::ComputerRoll => self.computer_die.as_ref().map(|d| ("My", d)),
            Purpose::UserRoll => self.user_die.as_ref().map(|d| ("Your", d)),
            Purpose::FirstMove => None,
        };
        if let Some((whose, die)) = die {
            if let Some(face) = die.face(reveal.result as usize) {
                lines.push(format!("{whose} roll result is {face}."));
            }
        }
        for line in lines {
            self.say(&line)?;
        }
        Ok(())
    }

    fn first_move_decided(&mut self, first: Side) -> Result<()> {
        match first {
            Side::User => self.say("You make the first move."),
            Side::Computer => self.say("I make the first move."),
        }
    }

    fn computer_chose(&mut self, _index: usize, die: &Die) -> Result<()> {
        self.computer_die = Some(die.clone());
        self.say(&format!("I choose the {die} dice."))
    }
}

fn io_error(e: std::io::Error) -> FairDiceError {
    FairDiceError::Interaction(e.to_string())
}

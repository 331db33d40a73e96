//! Non-transitive dice game driven by fair exchanges.
//!
//! Turn order and both rolls come from commit-reveal exchanges, so neither the
//! computer nor the user can bias them. When the computer picks second it takes
//! the die with the best odds against the user's, which is where the
//! non-transitive advantage comes from.

use crate::crypto::{CommitmentScheme, HmacSha256Scheme, SecureDraw};
use crate::dice::{DiceSet, Die, ProbabilityTable};
use crate::error::{FairDiceError, Result};
use crate::protocol::{Announcement, Counterpart, FairRandom, Reveal};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::info;

/// Fewest dice that make a game
pub const MIN_GAME_DICE: usize = 3;

/// Participant
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Computer,
    User,
}

impl Side {
    /// Get the opponent
    pub fn opponent(&self) -> Side {
        match self {
            Side::Computer => Side::User,
            Side::User => Side::Computer,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Computer => write!(f, "computer"),
            Side::User => write!(f, "user"),
        }
    }
}

/// Game result
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    ComputerWins,
    UserWins,
    Tie,
}

impl Outcome {
    /// Higher face wins
    pub fn from_faces(computer_face: i64, user_face: i64) -> Self {
        match computer_face.cmp(&user_face) {
            std::cmp::Ordering::Greater => Outcome::ComputerWins,
            std::cmp::Ordering::Less => Outcome::UserWins,
            std::cmp::Ordering::Equal => Outcome::Tie,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::ComputerWins => "Computer wins",
            Outcome::UserWins => "User wins",
            Outcome::Tie => "Tie",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What a fair exchange decides
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Purpose {
    /// Range 0..=1; the user moves first when the result is 0
    FirstMove,
    ComputerRoll,
    UserRoll,
}

/// The user's side of the game: choices in, announcements and reveals out
pub trait GameInteraction {
    /// Supply the user's value for an exchange
    fn contribute(&mut self, purpose: Purpose, announcement: &Announcement) -> Result<u32>;

    /// Pick one of `available` (indices into `dice`)
    fn choose_die(
        &mut self,
        dice: &DiceSet,
        available: &[usize],
        table: &ProbabilityTable,
    ) -> Result<usize>;

    fn revealed(&mut self, _purpose: Purpose, _reveal: &Reveal) -> Result<()> {
        Ok(())
    }

    fn first_move_decided(&mut self, _first: Side) -> Result<()> {
        Ok(())
    }

    fn computer_chose(&mut self, _index: usize, _die: &Die) -> Result<()> {
        Ok(())
    }
}

/// Adapts a game interaction to a single exchange
struct Exchange<'a, I: ?Sized> {
    purpose: Purpose,
    interaction: &'a mut I,
}

impl<I: GameInteraction + ?Sized> Counterpart for Exchange<'_, I> {
    fn contribute(&mut self, announcement: &Announcement) -> Result<u32> {
        self.interaction.contribute(self.purpose, announcement)
    }

    fn observe_reveal(&mut self, reveal: &Reveal) -> Result<()> {
        self.interaction.revealed(self.purpose, reveal)
    }
}

/// Everything needed to audit a finished game
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GameReport {
    pub first_move: Side,
    pub computer_die: usize,
    pub user_die: usize,
    pub computer_face: i64,
    pub user_face: i64,
    pub outcome: Outcome,
    /// First move, computer roll, user roll
    pub exchanges: Vec<Reveal>,
}

impl GameReport {
    /// Audit the whole game against the dice it was played with
    ///
    /// Every exchange must open its commitment over the expected range, and
    /// turn order, both faces, and the outcome must follow from the results.
    pub fn verify<C: CommitmentScheme + ?Sized>(&self, scheme: &C, dice: &DiceSet) -> bool {
        let [toss, computer_roll, user_roll] = self.exchanges.as_slice() else {
            return false;
        };
        if !self.exchanges.iter().all(|reveal| reveal.verify(scheme)) {
            return false;
        }

        let face_count = dice.face_count() as u64;
        let expected_first = if toss.result == 0 {
            Side::User
        } else {
            Side::Computer
        };
        let rolled = |index: usize, roll: &Reveal| {
            dice.get(index)
                .and_then(|die| die.face(roll.result as usize))
        };

        toss.range_size == 2
            && computer_roll.range_size == face_count
            && user_roll.range_size == face_count
            && self.first_move == expected_first
            && self.computer_die != self.user_die
            && rolled(self.computer_die, computer_roll) == Some(self.computer_face)
            && rolled(self.user_die, user_roll) == Some(self.user_face)
            && self.outcome == Outcome::from_faces(self.computer_face, self.user_face)
    }
}

/// One game over a validated dice set
pub struct DiceGame<R, C = HmacSha256Scheme> {
    dice: DiceSet,
    table: ProbabilityTable,
    fair: FairRandom<R, C>,
}

impl<R: SecureDraw, C: CommitmentScheme> DiceGame<R, C> {
    pub fn new(dice: DiceSet, fair: FairRandom<R, C>) -> Result<Self> {
        if dice.len() < MIN_GAME_DICE {
            return Err(FairDiceError::InvalidArgument(format!(
                "at least {MIN_GAME_DICE} dice are required, got {}",
                dice.len()
            )));
        }
        let table = ProbabilityTable::build(dice.dice());
        Ok(Self { dice, table, fair })
    }

    pub fn dice(&self) -> &DiceSet {
        &self.dice
    }

    pub fn table(&self) -> &ProbabilityTable {
        &self.table
    }

    pub fn scheme(&self) -> &C {
        self.fair.scheme()
    }

    pub fn play<I: GameInteraction + ?Sized>(
        &mut self,
        interaction: &mut I,
    ) -> Result<GameReport> {
        let mut exchanges = Vec::with_capacity(3);

        let toss = self.exchange(1, Purpose::FirstMove, interaction)?;
        let first_move = if toss.result == 0 {
            Side::User
        } else {
            Side::Computer
        };
        exchanges.push(toss);
        info!("First move: {}", first_move);
        interaction.first_move_decided(first_move)?;

        let (computer_die, user_die) = match first_move {
            Side::User => {
                let all: Vec<usize> = (0..self.dice.len()).collect();
                let user_die = self.user_choice(&all, interaction)?;
                let computer_die = self.table.best_counter(user_die).ok_or_else(|| {
                    FairDiceError::InvalidArgument("no die left for the computer".to_string())
                })?;
                self.announce_computer_choice(computer_die, interaction)?;
                (computer_die, user_die)
            }
            Side::Computer => {
                let computer_die = self.fair.source_mut().next(self.dice.len() as u64)? as usize;
                self.announce_computer_choice(computer_die, interaction)?;
                let rest: Vec<usize> = (0..self.dice.len())
                    .filter(|&i| i != computer_die)
                    .collect();
                let user_die = self.user_choice(&rest, interaction)?;
                (computer_die, user_die)
            }
        };

        let (computer_face, computer_roll) =
            self.roll(computer_die, Purpose::ComputerRoll, interaction)?;
        exchanges.push(computer_roll);
        let (user_face, user_roll) = self.roll(user_die, Purpose::UserRoll, interaction)?;
        exchanges.push(user_roll);

        let outcome = Outcome::from_faces(computer_face, user_face);
        info!(
            "Computer rolled {} on die #{}, user rolled {} on die #{}: {}",
            computer_face, computer_die, user_face, user_die, outcome
        );

        Ok(GameReport {
            first_move,
            computer_die,
            user_die,
            computer_face,
            user_face,
            outcome,
            exchanges,
        })
    }

    fn exchange<I: GameInteraction + ?Sized>(
        &mut self,
        range_max: u32,
        purpose: Purpose,
        interaction: &mut I,
    ) -> Result<Reveal> {
        let mut counterpart = Exchange {
            purpose,
            interaction,
        };
        self.fair.execute(range_max, &mut counterpart)
    }

    fn user_choice<I: GameInteraction + ?Sized>(
        &self,
        available: &[usize],
        interaction: &mut I,
    ) -> Result<usize> {
        let choice = interaction.choose_die(&self.dice, available, &self.table)?;
        if !available.contains(&choice) {
            return Err(FairDiceError::InvalidArgument(format!(
                "die #{choice} is not available"
            )));
        }
        info!("User chose die #{}", choice);
        Ok(choice)
    }

    fn announce_computer_choice<I: GameInteraction + ?Sized>(
        &self,
        index: usize,
        interaction: &mut I,
    ) -> Result<()> {
        let die = self.die(index)?;
        info!("Computer chose die #{} {}", index, die);
        interaction.computer_chose(index, die)
    }

    fn roll<I: GameInteraction + ?Sized>(
        &mut self,
        die_index: usize,
        purpose: Purpose,
        interaction: &mut I,
    ) -> Result<(i64, Reveal)> {
        let face_count = self.die(die_index)?.face_count();
        let range_max = u32::try_from(face_count - 1).map_err(|_| {
            FairDiceError::InvalidArgument(format!("a die cannot have {face_count} faces"))
        })?;
        let reveal = self.exchange(range_max, purpose, interaction)?;
        let face = self
            .die(die_index)?
            .face(reveal.result as usize)
            .ok_or(FairDiceError::OutOfRange {
                value: u64::from(reveal.result),
                range_size: face_count as u64,
            })?;
        Ok((face, reveal))
    }

    fn die(&self, index: usize) -> Result<&Die> {
        self.dice.get(index).ok_or(FairDiceError::OutOfRange {
            value: index as u64,
            range_size: self.dice.len() as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::SeededRandomSource;

    /// Picks the first available die from its preference list
    struct ScriptedUser {
        preference: Vec<usize>,
        contribution: u32,
        first_move: Option<Side>,
        computer_choice: Option<usize>,
        reveals: Vec<Purpose>,
    }

    impl ScriptedUser {
        fn new(preference: Vec<usize>, contribution: u32) -> Self {
            Self {
                preference,
                contribution,
                first_move: None,
                computer_choice: None,
                reveals: Vec::new(),
            }
        }
    }

    impl GameInteraction for ScriptedUser {
        fn contribute(&mut self, _purpose: Purpose, announcement: &Announcement) -> Result<u32> {
            Ok((u64::from(self.contribution) % announcement.range_size) as u32)
        }

        fn choose_die(
            &mut self,
            _dice: &DiceSet,
            available: &[usize],
            _table: &ProbabilityTable,
        ) -> Result<usize> {
            self.preference
                .iter()
                .copied()
                .find(|i| available.contains(i))
                .ok_or(FairDiceError::Aborted)
        }

        fn revealed(&mut self, purpose: Purpose, _reveal: &Reveal) -> Result<()> {
            self.reveals.push(purpose);
            Ok(())
        }

        fn first_move_decided(&mut self, first: Side) -> Result<()> {
            self.first_move = Some(first);
            Ok(())
        }

        fn computer_chose(&mut self, index: usize, _die: &Die) -> Result<()> {
            self.computer_choice = Some(index);
            Ok(())
        }
    }

    fn classic_dice() -> DiceSet {
        DiceSet::parse(&["2,2,4,4,9,9", "1,1,6,6,8,8", "3,3,5,5,7,7"]).unwrap()
    }

    fn game(seed: u64) -> DiceGame<SeededRandomSource> {
        DiceGame::new(
            classic_dice(),
            FairRandom::new(SeededRandomSource::new(seed), HmacSha256Scheme),
        )
        .unwrap()
    }

    #[test]
    fn test_side_opponent() {
        assert_eq!(Side::Computer.opponent(), Side::User);
        assert_eq!(Side::User.opponent(), Side::Computer);
    }

    #[test]
    fn test_outcome_from_faces() {
        assert_eq!(Outcome::from_faces(5, 3), Outcome::ComputerWins);
        assert_eq!(Outcome::from_faces(3, 5), Outcome::UserWins);
        assert_eq!(Outcome::from_faces(4, 4), Outcome::Tie);
        assert_eq!(Outcome::Tie.to_string(), "Tie");
    }

    #[test]
    fn test_too_few_dice_rejected() {
        let dice = DiceSet::parse(&["1,2", "3,4"]).unwrap();
        let result = DiceGame::new(
            dice,
            FairRandom::new(SeededRandomSource::new(0), HmacSha256Scheme),
        );
        assert!(matches!(result, Err(FairDiceError::InvalidArgument(_))));
    }

    #[test]
    fn test_game_report_is_consistent() {
        for seed in 0..32 {
            let mut game = game(seed);
            let mut user = ScriptedUser::new(vec![0, 1, 2], 1);
            let report = game.play(&mut user).unwrap();

            assert_eq!(user.first_move, Some(report.first_move));
            assert_eq!(user.computer_choice, Some(report.computer_die));
            assert_ne!(report.computer_die, report.user_die);
            assert_eq!(
                user.reveals,
                vec![Purpose::FirstMove, Purpose::ComputerRoll, Purpose::UserRoll]
            );

            let computer = game.dice().get(report.computer_die).unwrap();
            let user_die = game.dice().get(report.user_die).unwrap();
            assert_eq!(
                computer.face(report.exchanges[1].result as usize),
                Some(report.computer_face)
            );
            assert_eq!(
                user_die.face(report.exchanges[2].result as usize),
                Some(report.user_face)
            );
            assert_eq!(
                report.outcome,
                Outcome::from_faces(report.computer_face, report.user_face)
            );
            assert!(report.verify(game.scheme(), game.dice()));
        }
    }

    #[test]
    fn test_tampered_report_fails_verification() {
        let mut game = game(11);
        let mut user = ScriptedUser::new(vec![0, 1, 2], 1);
        let report = game.play(&mut user).unwrap();
        assert!(report.verify(game.scheme(), game.dice()));

        let mut forged = report.clone();
        forged.outcome = match report.outcome {
            Outcome::UserWins => Outcome::ComputerWins,
            _ => Outcome::UserWins,
        };
        assert!(!forged.verify(game.scheme(), game.dice()));

        let mut forged = report.clone();
        forged.user_face += 100;
        forged.outcome = Outcome::UserWins;
        assert!(!forged.verify(game.scheme(), game.dice()));

        let mut forged = report.clone();
        forged.first_move = report.first_move.opponent();
        assert!(!forged.verify(game.scheme(), game.dice()));

        let mut forged = report.clone();
        forged.computer_die = report.user_die;
        assert!(!forged.verify(game.scheme(), game.dice()));

        let mut forged = report.clone();
        forged.exchanges.pop();
        assert!(!forged.verify(game.scheme(), game.dice()));

        let other = DiceSet::parse(&["1,1,1,1,1,1", "2,2,2,2,2,2", "3,3,3,3,3,3"]).unwrap();
        assert!(!report.verify(game.scheme(), &other));
    }

    #[test]
    fn test_notification_failure_stops_game() {
        struct Disconnected;

        impl GameInteraction for Disconnected {
            fn contribute(
                &mut self,
                _purpose: Purpose,
                _announcement: &Announcement,
            ) -> Result<u32> {
                Ok(0)
            }

            fn choose_die(
                &mut self,
                _dice: &DiceSet,
                available: &[usize],
                _table: &ProbabilityTable,
            ) -> Result<usize> {
                Ok(available[0])
            }

            fn revealed(&mut self, _purpose: Purpose, _reveal: &Reveal) -> Result<()> {
                Err(FairDiceError::Interaction("broken pipe".to_string()))
            }
        }

        let result = game(4).play(&mut Disconnected);
        assert!(matches!(result, Err(FairDiceError::Interaction(_))));
    }

    #[test]
    fn test_computer_counters_when_user_goes_first() {
        let mut seen_user_first = false;
        let mut seen_computer_first = false;
        for seed in 0..64 {
            let mut game = game(seed);
            let mut user = ScriptedUser::new(vec![1, 0, 2], 0);
            let report = game.play(&mut user).unwrap();
            match report.first_move {
                Side::User => {
                    seen_user_first = true;
                    assert_eq!(report.user_die, 1);
                    assert_eq!(
                        Some(report.computer_die),
                        game.table().best_counter(report.user_die)
                    );
                    assert_eq!(report.computer_die, 0);
                }
                Side::Computer => {
                    seen_computer_first = true;
                    assert_ne!(report.user_die, report.computer_die);
                }
            }
        }
        assert!(seen_user_first && seen_computer_first);
    }

    #[test]
    fn test_unavailable_choice_rejected() {
        struct Stubborn;

        impl GameInteraction for Stubborn {
            fn contribute(
                &mut self,
                _purpose: Purpose,
                _announcement: &Announcement,
            ) -> Result<u32> {
                Ok(0)
            }

            fn choose_die(
                &mut self,
                _dice: &DiceSet,
                _available: &[usize],
                _table: &ProbabilityTable,
            ) -> Result<usize> {
                Ok(7)
            }
        }

        let result = game(1).play(&mut Stubborn);
        assert!(matches!(result, Err(FairDiceError::InvalidArgument(_))));
    }

    #[test]
    fn test_abort_propagates() {
        struct Quitter;

        impl GameInteraction for Quitter {
            fn contribute(
                &mut self,
                _purpose: Purpose,
                _announcement: &Announcement,
            ) -> Result<u32> {
                Err(FairDiceError::Aborted)
            }

            fn choose_die(
                &mut self,
                _dice: &DiceSet,
                _available: &[usize],
                _table: &ProbabilityTable,
            ) -> Result<usize> {
                Err(FairDiceError::Aborted)
            }
        }

        assert!(matches!(game(2).play(&mut Quitter), Err(FairDiceError::Aborted)));
    }
}

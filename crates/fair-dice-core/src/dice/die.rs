//! Dice definitions and validation of a playable set.

use crate::error::{FairDiceError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A die with an ordered, non-empty list of integer faces
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<i64>", into = "Vec<i64>")]
pub struct Die {
    faces: Vec<i64>,
}

impl Die {
    /// Create a die, rejecting an empty face list
    pub fn new(faces: Vec<i64>) -> Result<Self> {
        if faces.is_empty() {
            return Err(FairDiceError::InvalidArgument(
                "a die needs at least one face".to_string(),
            ));
        }
        Ok(Self { faces })
    }

    pub fn faces(&self) -> &[i64] {
        &self.faces
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Face shown when the roll lands on `index`
    pub fn face(&self, index: usize) -> Option<i64> {
        self.faces.get(index).copied()
    }
}

impl TryFrom<Vec<i64>> for Die {
    type Error = FairDiceError;

    fn try_from(faces: Vec<i64>) -> Result<Self> {
        Self::new(faces)
    }
}

impl From<Die> for Vec<i64> {
    fn from(die: Die) -> Self {
        die.faces
    }
}

impl FromStr for Die {
    type Err = FairDiceError;

    /// Parse comma-separated faces such as `2,2,4,4,9,9`
    fn from_str(s: &str) -> Result<Self> {
        if s.trim().is_empty() {
            return Err(FairDiceError::InvalidArgument(
                "a die needs at least one face".to_string(),
            ));
        }
        let faces = s
            .split(',')
            .map(|face| {
                let face = face.trim();
                face.parse::<i64>().map_err(|_| {
                    FairDiceError::InvalidArgument(format!("face `{face}` is not an integer"))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Self::new(faces)
    }
}

impl fmt::Display for Die {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let faces: Vec<String> = self.faces.iter().map(i64::to_string).collect();
        write!(f, "[{}]", faces.join(","))
    }
}

/// Dice used together in one game; every die has the same face count
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DiceSet {
    dice: Vec<Die>,
}

impl DiceSet {
    pub fn new(dice: Vec<Die>) -> Result<Self> {
        let Some(first) = dice.first() else {
            return Err(FairDiceError::InvalidArgument(
                "no dice were given".to_string(),
            ));
        };
        let expected = first.face_count();
        if let Some((index, die)) = dice
            .iter()
            .enumerate()
            .find(|(_, die)| die.face_count() != expected)
        {
            return Err(FairDiceError::InvalidArgument(format!(
                "die #{} {} has {} faces, but die #1 has {}",
                index + 1,
                die,
                die.face_count(),
                expected
            )));
        }
        Ok(Self { dice })
    }

    /// Parse one die per argument
    pub fn parse<S: AsRef<str>>(args: &[S]) -> Result<Self> {
        let dice = args
            .iter()
            .enumerate()
            .map(|(index, arg)| {
                let arg = arg.as_ref();
                arg.parse::<Die>().map_err(|e| match e {
                    FairDiceError::InvalidArgument(reason) => FairDiceError::InvalidArgument(
                        format!("die #{} `{}`: {}", index + 1, arg, reason),
                    ),
                    other => other,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Self::new(dice)
    }

    pub fn dice(&self) -> &[Die] {
        &self.dice
    }

    pub fn get(&self, index: usize) -> Option<&Die> {
        self.dice.get(index)
    }

    pub fn len(&self) -> usize {
        self.dice.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dice.is_empty()
    }

    /// Face count shared by every die in the set
    pub fn face_count(&self) -> usize {
        self.dice.first().map(Die::face_count).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_die() {
        let die: Die = "2,2,4,4,9,9".parse().unwrap();
        assert_eq!(die.faces(), &[2, 2, 4, 4, 9, 9]);
        assert_eq!(die.face_count(), 6);
        assert_eq!(die.face(4), Some(9));
        assert_eq!(die.face(6), None);
    }

    #[test]
    fn test_parse_die_with_spaces_and_negatives() {
        let die: Die = " -1, 0 ,7".parse().unwrap();
        assert_eq!(die.faces(), &[-1, 0, 7]);
    }

    #[test]
    fn test_single_face_die() {
        let die: Die = "5".parse().unwrap();
        assert_eq!(die.faces(), &[5]);
    }

    #[test]
    fn test_empty_die_rejected() {
        assert!(matches!(Die::new(vec![]), Err(FairDiceError::InvalidArgument(_))));
        assert!(matches!("".parse::<Die>(), Err(FairDiceError::InvalidArgument(_))));
        assert!(matches!("1,,2".parse::<Die>(), Err(FairDiceError::InvalidArgument(_))));
    }

    #[test]
    fn test_non_integer_face_rejected() {
        let err = "1,2,x".parse::<Die>().unwrap_err();
        assert_eq!(err.to_string(), "Invalid argument: face `x` is not an integer");
        assert!("1.5,2".parse::<Die>().is_err());
    }

    #[test]
    fn test_display() {
        let die: Die = "1,1,6,6,8,8".parse().unwrap();
        assert_eq!(die.to_string(), "[1,1,6,6,8,8]");
    }

    #[test]
    fn test_die_serde() {
        let die: Die = "3,5,7".parse().unwrap();
        assert_eq!(serde_json::to_string(&die).unwrap(), "[3,5,7]");
        assert_eq!(serde_json::from_str::<Die>("[3,5,7]").unwrap(), die);
        assert!(serde_json::from_str::<Die>("[]").is_err());
    }

    #[test]
    fn test_parse_dice_set() {
        let set = DiceSet::parse(&["2,2,4,4,9,9", "1,1,6,6,8,8", "3,3,5,5,7,7"]).unwrap();
        assert_eq!(set.len(), 3);
        assert_eq!(set.face_count(), 6);
        assert_eq!(set.get(1).unwrap().faces(), &[1, 1, 6, 6, 8, 8]);
        assert!(set.get(3).is_none());
    }

    #[test]
    fn test_mismatched_face_counts_rejected() {
        let err = DiceSet::parse(&["1,2,3", "1,2,3", "1,2"]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid argument: die #3 [1,2] has 2 faces, but die #1 has 3"
        );
    }

    #[test]
    fn test_bad_argument_is_located() {
        let err = DiceSet::parse(&["1,2,3", "1,a,3"]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid argument: die #2 `1,a,3`: face `a` is not an integer"
        );
    }

    #[test]
    fn test_empty_set_rejected() {
        let args: [&str; 0] = [];
        assert!(matches!(
            DiceSet::parse(&args),
            Err(FairDiceError::InvalidArgument(_))
        ));
    }
}

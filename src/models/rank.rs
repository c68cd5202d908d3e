use std::fmt;

/// Display tier earned by a habit streak.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Rank {
    SleepyCucumber,
    MintNewbie,
    SteadyMintling,
    MintExplorer,
    HabitKeeper,
    LegendaryMintMage,
}

impl Rank {
    pub fn from_streak(streak: u32) -> Rank {
        match streak {
            0 => Rank::SleepyCucumber,
            1..=3 => Rank::MintNewbie,
            4..=7 => Rank::SteadyMintling,
            8..=14 => Rank::MintExplorer,
            15..=21 => Rank::HabitKeeper,
            _ => Rank::LegendaryMintMage,
        }
    }

    pub fn tier(self) -> u8 {
        self as u8
    }

    pub fn label(self) -> &'static str {
        match self {
            Rank::SleepyCucumber => "sleepy cucumber",
            Rank::MintNewbie => "mint newbie",
            Rank::SteadyMintling => "steady mintling",
            Rank::MintExplorer => "mint explorer",
            Rank::HabitKeeper => "habit keeper",
            Rank::LegendaryMintMage => "legendary mint mage",
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ABOUTME: Layout engine mapping a secondary-agent count to an ordered split plan
//
// Pure and deterministic: a layout is a tagged variant, its plan is a static
// table of split steps. Steps name the pane to split by role so the engine
// never needs to know about live multiplexer handles.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::models::PaneRole;

/// Smallest supported number of secondary agents
pub const MIN_SECONDARIES: usize = 1;
/// Largest supported number of secondary agents
pub const MAX_SECONDARIES: usize = 4;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    #[error("unsupported layout: {0} secondary agents requested (supported: 1-4)")]
    Unsupported(usize),
}

/// Direction of the divider created by a split
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    /// Vertical divider: the new pane opens to the right of its parent
    Vertical,
    /// Horizontal divider: the new pane opens below its parent
    Horizontal,
}

/// One split operation of a plan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitStep {
    /// Existing pane to split
    pub parent: PaneRole,
    pub orientation: Orientation,
    /// Share of the parent's area given to the new pane, in percent
    pub ratio: u8,
    /// Role assigned to the pane the split creates
    pub new_pane: PaneRole,
}

impl SplitStep {
    const fn new(parent: PaneRole, orientation: Orientation, ratio: u8, new_pane: PaneRole) -> Self {
        Self {
            parent,
            orientation,
            ratio,
            new_pane,
        }
    }
}

/// Fixed pane arrangements, one per supported secondary count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Layout {
    /// `main` | `secondary1`
    SideBySide,
    /// `main` | right column of `secondary1` over `secondary2`
    RightStackTwo,
    /// `main` | right column of `secondary1..3` stacked
    RightStackThree,
    /// `main` | `secondary1` over `secondary2` | `secondary3` over `secondary4`
    ThreeColumns,
}

use Orientation::{Horizontal, Vertical};
use PaneRole::{Main, Secondary};

const SIDE_BY_SIDE: &[SplitStep] = &[SplitStep::new(Main, Vertical, 50, Secondary(1))];

const RIGHT_STACK_TWO: &[SplitStep] = &[
    SplitStep::new(Main, Vertical, 50, Secondary(1)),
    SplitStep::new(Secondary(1), Horizontal, 50, Secondary(2)),
];

// secondary2 takes two thirds of the column, then gives half of that to secondary3
const RIGHT_STACK_THREE: &[SplitStep] = &[
    SplitStep::new(Main, Vertical, 50, Secondary(1)),
    SplitStep::new(Secondary(1), Horizontal, 67, Secondary(2)),
    SplitStep::new(Secondary(2), Horizontal, 50, Secondary(3)),
];

const THREE_COLUMNS: &[SplitStep] = &[
    SplitStep::new(Main, Vertical, 67, Secondary(1)),
    SplitStep::new(Secondary(1), Vertical, 50, Secondary(3)),
    SplitStep::new(Secondary(1), Horizontal, 50, Secondary(2)),
    SplitStep::new(Secondary(3), Horizontal, 50, Secondary(4)),
];

impl Layout {
    pub const ALL: [Self; 4] = [
        Self::SideBySide,
        Self::RightStackTwo,
        Self::RightStackThree,
        Self::ThreeColumns,
    ];

    /// Pick the layout for a number of secondary agents
    pub const fn for_secondaries(count: usize) -> Result<Self, LayoutError> {
        match count {
            1 => Ok(Self::SideBySide),
            2 => Ok(Self::RightStackTwo),
            3 => Ok(Self::RightStackThree),
            4 => Ok(Self::ThreeColumns),
            n => Err(LayoutError::Unsupported(n)),
        }
    }

    pub const fn secondaries(self) -> usize {
        match self {
            Self::SideBySide => 1,
            Self::RightStackTwo => 2,
            Self::RightStackThree => 3,
            Self::ThreeColumns => 4,
        }
    }

    /// Number of panes a freshly spawned session of this layout has
    pub const fn pane_count(self) -> usize {
        self.secondaries() + 1
    }

    pub const fn steps(self) -> &'static [SplitStep] {
        match self {
            Self::SideBySide => SIDE_BY_SIDE,
            Self::RightStackTwo => RIGHT_STACK_TWO,
            Self::RightStackThree => RIGHT_STACK_THREE,
            Self::ThreeColumns => THREE_COLUMNS,
        }
    }

    pub const fn id(self) -> &'static str {
        match self {
            Self::SideBySide => "side-by-side",
            Self::RightStackTwo => "right-stack-two",
            Self::RightStackThree => "right-stack-three",
            Self::ThreeColumns => "three-columns",
        }
    }

    pub fn plan(self) -> LayoutPlan {
        LayoutPlan {
            layout: self,
            steps: self.steps().to_vec(),
        }
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Ordered split sequence for one spawn. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutPlan {
    pub layout: Layout,
    pub steps: Vec<SplitStep>,
}

impl LayoutPlan {
    /// Every role the plan produces, `main` first, then in creation order
    pub fn roles(&self) -> Vec<PaneRole> {
        std::iter::once(Main)
            .chain(self.steps.iter().map(|step| step.new_pane))
            .collect()
    }
}

/// Compute the split plan for `secondaries` agents next to the main one
pub fn plan(secondaries: usize) -> Result<LayoutPlan, LayoutError> {
    Layout::for_secondaries(secondaries).map(Layout::plan)
}

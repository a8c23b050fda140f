use super::Grid;
use crate::models::availability::AggregateResult;

/// Tooltip content shown for a schedulable cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tooltip {
    NoData,
    Detail {
        available: Vec<String>,
        unavailable: Vec<String>,
    },
}

impl Tooltip {
    pub fn to_text(&self) -> String {
        match self {
            Tooltip::NoData => "No availability data for this slot.".to_string(),
            Tooltip::Detail {
                available,
                unavailable,
            } => format!(
                "Available: {}\nUnavailable: {}",
                available.join(", "),
                unavailable.join(", ")
            ),
        }
    }
}

/// Aggregate fill and tooltip for one cell, index-aligned with
/// [`Grid::cells`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellOverlay {
    pub fill_percent: u8,
    pub tooltip: Option<Tooltip>,
}

impl Grid {
    /// Project an aggregate onto the grid. Cells outside the event window
    /// always read 0 % and carry no tooltip.
    pub fn overlay(&self, aggregate: &AggregateResult) -> Vec<CellOverlay> {
        self.cells
            .iter()
            .map(|cell| {
                if !cell.schedulable {
                    return CellOverlay {
                        fill_percent: 0,
                        tooltip: None,
                    };
                }

                let tooltip = match aggregate.detail(&cell.key) {
                    Some(detail) => Tooltip::Detail {
                        available: detail.available.clone(),
                        unavailable: detail.unavailable.clone(),
                    },
                    None => Tooltip::NoData,
                };

                CellOverlay {
                    fill_percent: aggregate.percentage(&cell.key),
                    tooltip: Some(tooltip),
                }
            })
            .collect()
    }
}

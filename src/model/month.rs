use crate::model::NumericField;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Debug)]
#[serde(rename_all = "lowercase")]
pub enum Month {
    Jan,
    Feb,
    Mar,
    Apr,
    May,
    Jun,
    Jul,
    Aug,
    Sep,
    Oct,
    Nov,
    Dec,
}

impl Month {
    /// Calendar order.
    pub const ALL: [Month; 12] = [
        Month::Jan,
        Month::Feb,
        Month::Mar,
        Month::Apr,
        Month::May,
        Month::Jun,
        Month::Jul,
        Month::Aug,
        Month::Sep,
        Month::Oct,
        Month::Nov,
        Month::Dec,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn key(self) -> &'static str {
        match self {
            Month::Jan => "jan",
            Month::Feb => "feb",
            Month::Mar => "mar",
            Month::Apr => "apr",
            Month::May => "may",
            Month::Jun => "jun",
            Month::Jul => "jul",
            Month::Aug => "aug",
            Month::Sep => "sep",
            Month::Oct => "oct",
            Month::Nov => "nov",
            Month::Dec => "dec",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Month::Jan => "Jan",
            Month::Feb => "Feb",
            Month::Mar => "Mar",
            Month::Apr => "Apr",
            Month::May => "May",
            Month::Jun => "Jun",
            Month::Jul => "Jul",
            Month::Aug => "Aug",
            Month::Sep => "Sep",
            Month::Oct => "Oct",
            Month::Nov => "Nov",
            Month::Dec => "Dec",
        }
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Twelve month-keyed quantities; every key is always present, possibly blank.
#[derive(Clone, PartialEq, Default, Serialize, Deserialize, Debug)]
#[serde(default)]
pub struct MonthlyData {
    pub jan: NumericField,
    pub feb: NumericField,
    pub mar: NumericField,
    pub apr: NumericField,
    pub may: NumericField,
    pub jun: NumericField,
    pub jul: NumericField,
    pub aug: NumericField,
    pub sep: NumericField,
    pub oct: NumericField,
    pub nov: NumericField,
    pub dec: NumericField,
}

impl MonthlyData {
    pub fn from_values<T: Into<NumericField> + Clone>(values: [T; 12]) -> Self {
        let mut data = MonthlyData::default();
        for (month, value) in Month::ALL.iter().zip(values.iter()) {
            *data.get_mut(*month) = value.clone().into();
        }
        data
    }

    pub fn get(&self, month: Month) -> &NumericField {
        match month {
            Month::Jan => &self.jan,
            Month::Feb => &self.feb,
            Month::Mar => &self.mar,
            Month::Apr => &self.apr,
            Month::May => &self.may,
            Month::Jun => &self.jun,
            Month::Jul => &self.jul,
            Month::Aug => &self.aug,
            Month::Sep => &self.sep,
            Month::Oct => &self.oct,
            Month::Nov => &self.nov,
            Month::Dec => &self.dec,
        }
    }

    pub fn get_mut(&mut self, month: Month) -> &mut NumericField {
        match month {
            Month::Jan => &mut self.jan,
            Month::Feb => &mut self.feb,
            Month::Mar => &mut self.mar,
            Month::Apr => &mut self.apr,
            Month::May => &mut self.may,
            Month::Jun => &mut self.jun,
            Month::Jul => &mut self.jul,
            Month::Aug => &mut self.aug,
            Month::Sep => &mut self.sep,
            Month::Oct => &mut self.oct,
            Month::Nov => &mut self.nov,
            Month::Dec => &mut self.dec,
        }
    }

    pub fn set<T: Into<NumericField>>(&mut self, month: Month, value: T) {
        *self.get_mut(month) = value.into();
    }

    /// Parse-or-zero values in calendar order.
    pub fn values(&self) -> [f64; 12] {
        let mut values = [0.0; 12];
        for month in Month::ALL.iter() {
            values[month.index()] = self.get(*month).value();
        }
        values
    }

    pub fn total(&self) -> f64 {
        self.values().iter().sum()
    }

    /// Running totals, so `accumulated()[11] == total()`.
    pub fn accumulated(&self) -> [f64; 12] {
        let mut running_total = 0.0;
        let mut accumulated = [0.0; 12];
        for (i, value) in self.values().iter().enumerate() {
            running_total += value;
            accumulated[i] = running_total;
        }
        accumulated
    }
}

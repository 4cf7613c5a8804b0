use std::{error, fmt};

use directions::DirectionsError;
use utility::timezone::TimeError;

#[derive(Debug, Clone)]
pub enum ScheduleError {
    Time(TimeError),
    Routing(DirectionsError),
    /// the provider answered but found no route between the endpoints
    NoRoute { from: String, to: String },
}

impl error::Error for ScheduleError {}

impl fmt::Display for ScheduleError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ScheduleError::Time(why) => write!(f, "{}", why),
            ScheduleError::Routing(why) => write!(f, "{}", why),
            ScheduleError::NoRoute { from, to } => {
                write!(f, "no route from '{}' to '{}'", from, to)
            }
        }
    }
}

impl From<TimeError> for ScheduleError {
    fn from(why: TimeError) -> Self {
        ScheduleError::Time(why)
    }
}

impl From<DirectionsError> for ScheduleError {
    fn from(why: DirectionsError) -> Self {
        ScheduleError::Routing(why)
    }
}

use chrono::{DateTime, Duration, Utc};
use directions::RouteSource;
use model::{Booking, Plan, Trip, Vehicle};
use utility::timezone::{parse_zone, resolve_instant, timezone_for_address};

pub mod context;
pub mod error;
pub mod output;
pub mod passes;

pub use context::{SchedulingContext, SchedulingDefaults};
pub use error::ScheduleError;

/// Greedy multi-pass scheduler. One instance plans one request: it owns the
/// growing plan and is dropped with it, so concurrent requests cannot
/// interfere.
pub struct Scheduler<'a> {
    directions: &'a dyn RouteSource,
    context: SchedulingContext,
    vehicles: Vec<Vehicle>,
}

impl<'a> Scheduler<'a> {
    pub fn new(directions: &'a dyn RouteSource, context: SchedulingContext) -> Self {
        Self {
            directions,
            context,
            vehicles: Vec::new(),
        }
    }

    /// Plans the given bookings onto the smallest fleet the greedy passes
    /// find. Stretcher trips are placed first, then wheelchair, then the
    /// rest; within a pass, trips go in pickup-time order and may reuse
    /// vehicles created by earlier passes.
    pub async fn schedule(mut self, bookings: Vec<Booking>) -> Result<Plan, ScheduleError> {
        let mut trips = Vec::with_capacity(bookings.len());
        for booking in bookings {
            trips.push(self.build_trip(booking).await?);
        }

        passes::mark_last_legs(&mut trips);

        for bucket in passes::bucket_by_assistance(trips) {
            for trip in bucket {
                self.assign(trip).await?;
            }
        }

        Ok(self.vehicles)
    }

    async fn build_trip(&self, mut booking: Booking) -> Result<Trip, ScheduleError> {
        let timezone = match timezone_for_address(&booking.pickup_address) {
            Some(timezone) => timezone,
            None => parse_zone(&booking.program_timezone)?,
        };
        let pickup_time = resolve_instant(&self.context.date, &booking.pickup_time, timezone)?;

        let route = self
            .directions
            .get_direction(&booking.pickup_address, &booking.dropoff_address, pickup_time)
            .await?
            .ok_or_else(|| ScheduleError::NoRoute {
                from: booking.pickup_address.clone(),
                to: booking.dropoff_address.clone(),
            })?;

        booking.travel_distance = Some(route.distance_in_meter);
        booking.travel_time = Some(route.duration_in_sec);

        Ok(Trip::new(
            booking,
            timezone,
            pickup_time,
            route.distance_in_meter,
            route.duration_in_sec,
        ))
    }

    /// Checks whether `trip` can follow the vehicle's current last trip and
    /// returns the estimated arrival at the pickup. A vehicle whose
    /// reposition leg has no route is skipped, not an error.
    async fn fit(
        &self,
        vehicle: &Vehicle,
        trip: &Trip,
    ) -> Result<Option<DateTime<Utc>>, ScheduleError> {
        let last = match vehicle.last_trip() {
            Some(last) => last,
            None => return Ok(None),
        };

        let free_at = last.finish_time(self.context.dropoff_unloading);
        let latest = trip.latest_pickup_time(self.context.after_pickup);
        if free_at > latest {
            return Ok(None);
        }

        if last.dropoff_address == trip.pickup_address {
            return Ok(Some(free_at));
        }

        let reposition = match self
            .directions
            .get_direction(&last.dropoff_address, &trip.pickup_address, free_at)
            .await?
        {
            Some(route) => route,
            None => return Ok(None),
        };

        let arrival = free_at + Duration::seconds(reposition.duration_in_sec);
        if arrival > latest {
            Ok(None)
        } else {
            Ok(Some(arrival))
        }
    }

    async fn assign(&mut self, mut trip: Trip) -> Result<(), ScheduleError> {
        let mut best: Option<(usize, DateTime<Utc>)> = None;

        for (index, vehicle) in self.vehicles.iter().enumerate() {
            let arrival = match self.fit(vehicle, &trip).await? {
                Some(arrival) => arrival,
                None => continue,
            };
            if self.context.debug {
                log::debug!(
                    "booking {}: vehicle {} could arrive at {}",
                    trip.booking.booking_id,
                    vehicle.index,
                    arrival
                );
            }
            best = match best {
                None => Some((index, arrival)),
                Some((_, current))
                    if pick_better(arrival, current, &trip, self.context.before_pickup) =>
                {
                    Some((index, arrival))
                }
                keep => keep,
            };
        }

        match best {
            None => {
                trip.earliest_arrival_time =
                    Some(trip.earliest_pickup_time(self.context.before_pickup));
                trip.adjusted_pickup_time = Some(trip.pickup_time);
                let mut vehicle = Vehicle::new(self.vehicles.len() + 1);
                if self.context.debug {
                    log::debug!(
                        "booking {}: no vehicle fits, creating vehicle {}",
                        trip.booking.booking_id,
                        vehicle.index
                    );
                }
                vehicle.add_trip(trip);
                self.vehicles.push(vehicle);
            }
            Some((index, arrival)) => {
                trip.earliest_arrival_time = Some(arrival);
                trip.adjusted_pickup_time = Some(arrival.max(trip.pickup_time));
                self.vehicles[index].add_trip(trip);
            }
        }
        Ok(())
    }
}

/// Selection policy between two feasible arrivals. While the current best is
/// comfortably inside the window, a later arrival wins (less idle waiting);
/// once the current best is already marginal, an earlier one wins.
fn pick_better(
    incoming: DateTime<Utc>,
    current: DateTime<Utc>,
    trip: &Trip,
    before_pickup: Duration,
) -> bool {
    if trip.is_last {
        if current > trip.pickup_time {
            incoming < current
        } else {
            incoming > current
        }
    } else {
        let early = trip.pickup_time - before_pickup;
        if current > early {
            incoming < current
        } else {
            incoming > current
        }
    }
}

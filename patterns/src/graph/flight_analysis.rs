//! Airports as vertices, flights as edges: degrees, route statistics and
//! connecting flights.

use super::TOPIC;
use crate::support::{banner, query, read_csv_file, register_view, section};
use dalgo_common::data_path;
use dalgo_core::FlowContext;
use dalgo_sql::show;
use datafusion::dataframe::DataFrame;
use datafusion::prelude::SessionContext;

/// Register `airports` (id, city, state) and `flights` (src, dst, carrier,
/// distance, dep_delay).
pub async fn register_tables(ctx: &FlowContext) -> anyhow::Result<(DataFrame, DataFrame)> {
    let airports = read_csv_file(ctx, data_path(TOPIC, "airports.csv")).await?;
    let flights = read_csv_file(ctx, data_path(TOPIC, "flights.csv")).await?;
    register_view(ctx.sql(), "airports", airports.clone())?;
    register_view(ctx.sql(), "flights", flights.clone())?;
    Ok((airports, flights))
}

pub async fn airport_degrees(ctx: &SessionContext) -> anyhow::Result<DataFrame> {
    query(
        ctx,
        "WITH outgoing AS (SELECT src AS airport, COUNT(*) AS out_flights FROM flights GROUP BY src), \
         incoming AS (SELECT dst AS airport, COUNT(*) AS in_flights FROM flights GROUP BY dst) \
         SELECT COALESCE(o.airport, i.airport) AS airport, \
                COALESCE(o.out_flights, 0) AS out_flights, \
                COALESCE(i.in_flights, 0) AS in_flights, \
                COALESCE(o.out_flights, 0) + COALESCE(i.in_flights, 0) AS total_flights \
         FROM outgoing o FULL OUTER JOIN incoming i ON o.airport = i.airport \
         ORDER BY total_flights DESC, airport",
    )
    .await
}

pub async fn longest_routes(ctx: &SessionContext) -> anyhow::Result<DataFrame> {
    query(
        ctx,
        "SELECT src, dst, MAX(distance) AS max_distance FROM flights \
         GROUP BY src, dst ORDER BY max_distance DESC, src, dst",
    )
    .await
}

pub async fn avg_delay_by_route(ctx: &SessionContext) -> anyhow::Result<DataFrame> {
    query(
        ctx,
        "SELECT src, dst, ROUND(AVG(dep_delay), 2) AS avg_delay, COUNT(*) AS flights \
         FROM flights GROUP BY src, dst ORDER BY avg_delay DESC, src, dst",
    )
    .await
}

pub async fn most_frequent_routes(ctx: &SessionContext) -> anyhow::Result<DataFrame> {
    query(
        ctx,
        "SELECT src, dst, COUNT(*) AS flight_count FROM flights \
         GROUP BY src, dst ORDER BY flight_count DESC, src, dst",
    )
    .await
}

fn quote(code: &str) -> String {
    format!("'{}'", code.replace('\'', "''"))
}

/// Direct flights when the route exists; otherwise the distinct two-leg
/// itineraries through a hub.
pub async fn connecting_flights(
    ctx: &SessionContext,
    origin: &str,
    destination: &str,
) -> anyhow::Result<DataFrame> {
    let (origin, destination) = (quote(origin), quote(destination));
    let direct = query(
        ctx,
        &format!(
            "SELECT src AS origin, dst AS destination, carrier, distance FROM flights \
             WHERE src = {origin} AND dst = {destination} ORDER BY carrier"
        ),
    )
    .await?;
    if direct.clone().count().await? > 0 {
        return Ok(direct);
    }
    query(
        ctx,
        &format!(
            "SELECT DISTINCT leg1.src AS origin, leg1.dst AS hub, leg2.dst AS destination, \
                    leg1.carrier AS carrier_1, leg2.carrier AS carrier_2, \
                    leg1.distance + leg2.distance AS total_distance \
             FROM flights leg1 JOIN flights leg2 ON leg1.dst = leg2.src \
             WHERE leg1.src = {origin} AND leg2.dst = {destination} \
             ORDER BY total_distance, hub, carrier_1, carrier_2"
        ),
    )
    .await
}

pub async fn run(ctx: &FlowContext) -> anyhow::Result<()> {
    banner("Flight Analysis: Graph Queries with DataFrames");
    let (airports, flights) = register_tables(ctx).await?;
    let sql = ctx.sql();
    println!("Airports: {}", airports.count().await?);
    println!("Flights: {}\n", flights.count().await?);

    section("Most connected airports (by total flights)");
    show(&airport_degrees(sql).await?, 5).await?;
    section("Longest flight routes");
    show(&longest_routes(sql).await?, 5).await?;
    section("Highest average departure delays (by route)");
    show(&avg_delay_by_route(sql).await?, 5).await?;
    section("Most frequent routes");
    show(&most_frequent_routes(sql).await?, 5).await?;

    for (origin, destination) in [("LAX", "LGA"), ("CLT", "BOS")] {
        section(&format!("Connecting flights: {origin} -> {destination}"));
        let connections = connecting_flights(sql, origin, destination).await?;
        show(&connections, 20).await?;
        println!("Connecting options found: {}\n", connections.count().await?);
    }
    Ok(())
}

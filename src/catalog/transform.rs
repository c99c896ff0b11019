//! `INSERT ... SELECT DISTINCT` statements moving staging rows into the
//! fact and dimension tables.
//!
//! Event timestamps are epoch milliseconds; `start_time` truncates them to
//! whole seconds. The `times` breakdown follows the convention in
//! [`crate::calendar`]: ISO-8601 week numbers and weekday 0 = Sunday.

use super::Table;

/// Statement filling `table`, or `None` for staging tables.
pub fn insert_select(table: Table) -> Option<&'static str> {
    match table {
        Table::Songplay => Some(SONGPLAY),
        Table::Users => Some(USERS),
        Table::Songs => Some(SONGS),
        Table::Artists => Some(ARTISTS),
        Table::Times => Some(TIMES),
        Table::StagingEvents | Table::StagingSongs => None,
    }
}

// Event rows with no song/artist text match never produce a fact row.
const SONGPLAY: &str = "
INSERT INTO songplay (
    start_time,
    user_id,
    level,
    song_id,
    artist_id,
    session_id,
    location,
    user_agent
)
SELECT DISTINCT
    TIMESTAMP 'epoch' + ev.ts / 1000 * INTERVAL '1 second' AS start_time,
    ev.userId     AS user_id,
    ev.level      AS level,
    so.song_id    AS song_id,
    so.artist_id  AS artist_id,
    ev.sessionId  AS session_id,
    ev.location   AS location,
    ev.userAgent  AS user_agent
FROM staging_events AS ev
JOIN staging_songs AS so
    ON  ev.artist = so.artist_name
    AND ev.song   = so.title
WHERE ev.page = 'NextSong';";

// One row per user: the attributes of their latest qualifying event.
const USERS: &str = "
INSERT INTO users (
    user_id,
    first_name,
    last_name,
    gender,
    level
)
SELECT DISTINCT
    u.user_id,
    u.first_name,
    u.last_name,
    u.gender,
    u.level
FROM (
    SELECT
        ev.userId    AS user_id,
        ev.firstName AS first_name,
        ev.lastName  AS last_name,
        ev.gender    AS gender,
        ev.level     AS level,
        ROW_NUMBER() OVER (
            PARTITION BY ev.userId
            ORDER BY ev.ts DESC NULLS LAST
        ) AS rn
    FROM staging_events AS ev
    WHERE ev.page = 'NextSong'
) AS u
WHERE u.rn = 1;";

// One row per song: the record with the most recent known year.
const SONGS: &str = "
INSERT INTO songs (
    song_id,
    title,
    artist_id,
    year,
    duration
)
SELECT DISTINCT
    s.song_id,
    s.title,
    s.artist_id,
    s.year,
    s.duration
FROM (
    SELECT
        so.song_id   AS song_id,
        so.title     AS title,
        so.artist_id AS artist_id,
        so.year      AS year,
        so.duration  AS duration,
        ROW_NUMBER() OVER (
            PARTITION BY so.song_id
            ORDER BY so.year DESC NULLS LAST, so.duration DESC NULLS LAST
        ) AS rn
    FROM staging_songs AS so
) AS s
WHERE s.rn = 1;";

// One row per artist, preferring a record that carries a location.
const ARTISTS: &str = "
INSERT INTO artists (
    artist_id,
    name,
    location,
    latitude,
    longitude
)
SELECT DISTINCT
    a.artist_id,
    a.name,
    a.location,
    a.latitude,
    a.longitude
FROM (
    SELECT
        so.artist_id        AS artist_id,
        so.artist_name      AS name,
        so.artist_location  AS location,
        so.artist_latitude  AS latitude,
        so.artist_longitude AS longitude,
        ROW_NUMBER() OVER (
            PARTITION BY so.artist_id
            ORDER BY
                CASE WHEN so.artist_location IS NULL THEN 1 ELSE 0 END,
                CASE WHEN so.artist_latitude IS NULL THEN 1 ELSE 0 END,
                so.song_id
        ) AS rn
    FROM staging_songs AS so
) AS a
WHERE a.rn = 1;";

const TIMES: &str = "
INSERT INTO times (
    start_time,
    hour,
    day,
    week,
    month,
    year,
    weekday
)
SELECT DISTINCT
    t.start_time,
    EXTRACT(hour  FROM t.start_time) AS hour,
    EXTRACT(day   FROM t.start_time) AS day,
    EXTRACT(week  FROM t.start_time) AS week,
    EXTRACT(month FROM t.start_time) AS month,
    EXTRACT(year  FROM t.start_time) AS year,
    EXTRACT(dow   FROM t.start_time) AS weekday
FROM (
    SELECT TIMESTAMP 'epoch' + ev.ts / 1000 * INTERVAL '1 second' AS start_time
    FROM staging_events AS ev
    WHERE ev.page = 'NextSong'
) AS t;";

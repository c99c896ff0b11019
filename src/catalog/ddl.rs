// src/catalog/ddl.rs
//
// Table definitions in Redshift dialect. DISTKEY / SORTKEY / DISTSTYLE are
// physical layout hints only; they do not change query results.

use super::Table;

/// `DROP TABLE IF EXISTS <table>;`
pub fn drop_table(table: Table) -> String {
    format!("DROP TABLE IF EXISTS {};", table.as_str())
}

/// `CREATE TABLE IF NOT EXISTS` for `table`.
pub fn create_table(table: Table) -> &'static str {
    match table {
        Table::StagingEvents => STAGING_EVENTS,
        Table::StagingSongs => STAGING_SONGS,
        Table::Songplay => SONGPLAY,
        Table::Users => USERS,
        Table::Songs => SONGS,
        Table::Artists => ARTISTS,
        Table::Times => TIMES,
    }
}

const STAGING_EVENTS: &str = "
CREATE TABLE IF NOT EXISTS staging_events (
    event_id      BIGINT IDENTITY(0,1) NOT NULL PRIMARY KEY,
    artist        VARCHAR                  NULL DISTKEY,
    auth          VARCHAR                  NULL,
    firstName     VARCHAR                  NULL,
    gender        VARCHAR                  NULL,
    itemInSession BIGINT                   NULL,
    lastName      VARCHAR                  NULL,
    length        DOUBLE PRECISION         NULL,
    level         VARCHAR                  NULL,
    location      VARCHAR                  NULL,
    method        VARCHAR                  NULL,
    page          VARCHAR                  NULL,
    registration  BIGINT                   NULL,
    sessionId     BIGINT               NOT NULL,
    song          VARCHAR                  NULL,
    status        SMALLINT                 NULL,
    ts            BIGINT                   NULL,
    userAgent     VARCHAR                  NULL,
    userId        VARCHAR              NOT NULL
);";

const STAGING_SONGS: &str = "
CREATE TABLE IF NOT EXISTS staging_songs (
    num_songs        BIGINT               NULL,
    artist_id        VARCHAR          NOT NULL,
    artist_latitude  DOUBLE PRECISION     NULL,
    artist_longitude DOUBLE PRECISION     NULL,
    artist_location  VARCHAR              NULL,
    artist_name      VARCHAR              NULL,
    song_id          VARCHAR          NOT NULL,
    title            VARCHAR              NULL,
    duration         DOUBLE PRECISION     NULL,
    year             SMALLINT             NULL DISTKEY
);";

const SONGPLAY: &str = "
CREATE TABLE IF NOT EXISTS songplay (
    songplay_id BIGINT IDENTITY(0,1) NOT NULL SORTKEY PRIMARY KEY,
    start_time  TIMESTAMP            NOT NULL,
    user_id     VARCHAR              NOT NULL,
    level       VARCHAR                  NULL,
    song_id     VARCHAR              NOT NULL DISTKEY,
    artist_id   VARCHAR              NOT NULL,
    session_id  BIGINT               NOT NULL,
    location    VARCHAR                  NULL,
    user_agent  VARCHAR                  NULL
);";

const USERS: &str = "
CREATE TABLE IF NOT EXISTS users (
    user_id    VARCHAR NOT NULL SORTKEY PRIMARY KEY,
    first_name VARCHAR     NULL,
    last_name  VARCHAR     NULL,
    gender     VARCHAR     NULL,
    level      VARCHAR     NULL
) DISTSTYLE ALL;";

const SONGS: &str = "
CREATE TABLE IF NOT EXISTS songs (
    song_id   VARCHAR          NOT NULL SORTKEY PRIMARY KEY,
    title     VARCHAR              NULL,
    artist_id VARCHAR          NOT NULL,
    year      SMALLINT             NULL,
    duration  DOUBLE PRECISION     NULL
);";

const ARTISTS: &str = "
CREATE TABLE IF NOT EXISTS artists (
    artist_id VARCHAR          NOT NULL SORTKEY PRIMARY KEY,
    name      VARCHAR              NULL,
    location  VARCHAR              NULL,
    latitude  DOUBLE PRECISION     NULL,
    longitude DOUBLE PRECISION     NULL
) DISTSTYLE ALL;";

const TIMES: &str = "
CREATE TABLE IF NOT EXISTS times (
    start_time TIMESTAMP NOT NULL SORTKEY PRIMARY KEY,
    hour       SMALLINT  NOT NULL,
    day        SMALLINT  NOT NULL,
    week       SMALLINT  NOT NULL,
    month      SMALLINT  NOT NULL,
    year       SMALLINT  NOT NULL,
    weekday    SMALLINT  NOT NULL
) DISTSTYLE ALL;";

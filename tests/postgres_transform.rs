//! Runs the transform statements against a real Postgres.
//!
//! Skipped unless `DWH_TEST_DSN` is set, e.g.
//!   DWH_TEST_DSN="host=localhost user=postgres password=postgres dbname=dwh_test"

use anyhow::Result;
use chrono::NaiveDateTime;
use songplay_dwh::{
    calendar::TimeParts,
    catalog::{ddl, transform::insert_select},
    run_batch,
    runner::Phase,
    PgSession, Session, Statement, Table,
};
use tokio_postgres::{Client, NoTls};

const SETUP: &str = "
DROP TABLE IF EXISTS staging_events;
DROP TABLE IF EXISTS staging_songs;
DROP TABLE IF EXISTS songplay;
DROP TABLE IF EXISTS times;
DROP TABLE IF EXISTS users;
DROP TABLE IF EXISTS songs;
DROP TABLE IF EXISTS artists;

CREATE TABLE staging_events (
    event_id      BIGSERIAL PRIMARY KEY,
    artist        VARCHAR,
    auth          VARCHAR,
    firstName     VARCHAR,
    gender        VARCHAR,
    itemInSession BIGINT,
    lastName      VARCHAR,
    length        DOUBLE PRECISION,
    level         VARCHAR,
    location      VARCHAR,
    method        VARCHAR,
    page          VARCHAR,
    registration  BIGINT,
    sessionId     BIGINT  NOT NULL,
    song          VARCHAR,
    status        SMALLINT,
    ts            BIGINT,
    userAgent     VARCHAR,
    userId        VARCHAR NOT NULL
);

CREATE TABLE staging_songs (
    num_songs        BIGINT,
    artist_id        VARCHAR NOT NULL,
    artist_latitude  DOUBLE PRECISION,
    artist_longitude DOUBLE PRECISION,
    artist_location  VARCHAR,
    artist_name      VARCHAR,
    song_id          VARCHAR NOT NULL,
    title            VARCHAR,
    duration         DOUBLE PRECISION,
    year             SMALLINT
);

CREATE TABLE songplay (
    songplay_id BIGSERIAL PRIMARY KEY,
    start_time  TIMESTAMP NOT NULL,
    user_id     VARCHAR   NOT NULL,
    level       VARCHAR,
    song_id     VARCHAR   NOT NULL,
    artist_id   VARCHAR   NOT NULL,
    session_id  BIGINT    NOT NULL,
    location    VARCHAR,
    user_agent  VARCHAR
);

CREATE TABLE times (
    start_time TIMESTAMP NOT NULL PRIMARY KEY,
    hour       SMALLINT  NOT NULL,
    day        SMALLINT  NOT NULL,
    week       SMALLINT  NOT NULL,
    month      SMALLINT  NOT NULL,
    year       SMALLINT  NOT NULL,
    weekday    SMALLINT  NOT NULL
);

CREATE TABLE users (
    user_id    VARCHAR NOT NULL PRIMARY KEY,
    first_name VARCHAR,
    last_name  VARCHAR,
    gender     VARCHAR,
    level      VARCHAR
);

CREATE TABLE songs (
    song_id   VARCHAR NOT NULL PRIMARY KEY,
    title     VARCHAR,
    artist_id VARCHAR NOT NULL,
    year      SMALLINT,
    duration  DOUBLE PRECISION
);

CREATE TABLE artists (
    artist_id VARCHAR NOT NULL PRIMARY KEY,
    name      VARCHAR,
    location  VARCHAR,
    latitude  DOUBLE PRECISION,
    longitude DOUBLE PRECISION
);

INSERT INTO staging_events (artist, song, page, ts, sessionId, userId, level, location, userAgent) VALUES
    ('Radiohead', 'Creep',        'NextSong', 1542241826796, 100, '10', 'free', 'Reading', 'UA'),
    ('Radiohead', 'Creep',        'NextSong', 1542241826796, 100, '10', 'free', 'Reading', 'UA'),
    ('Radiohead', 'Karma Police', 'NextSong', 1542241900000, 100, '10', 'free', 'Reading', 'UA'),
    ('Nobody',    'Nothing',      'NextSong', 1542241826001, 101, '11', 'paid', 'Leeds',   'UA'),
    ('Nobody',    'Nothing',      'NextSong', 1542241826796, 200, '97', 'free', 'Austin',  'UA'),
    ('Nobody',    'Nothing',      'NextSong', 1542241900000, 201, '97', 'paid', 'Austin',  'UA'),
    (NULL,        NULL,           'Home',     1542242000000, 100, '10', 'free', 'Reading', 'UA');

INSERT INTO staging_songs (artist_id, artist_name, artist_location, song_id, title) VALUES
    ('ARRH', 'Radiohead', 'Oxford', 'SOCREEP', 'Creep'),
    ('ARRH', 'Radiohead', NULL,     'SONOPE',  'No Surprises');
";

async fn connect(dsn: &str) -> Result<Client> {
    let (client, connection) = tokio_postgres::connect(dsn, NoTls).await?;
    tokio::spawn(async move {
        let _ = connection.await;
    });
    Ok(client)
}

#[tokio::test]
async fn transforms_filter_join_and_dedupe() -> Result<()> {
    let dsn = match std::env::var("DWH_TEST_DSN") {
        Ok(value) => value,
        Err(_) => return Ok(()),
    };

    let client = connect(&dsn).await?;
    client.batch_execute(SETUP).await?;

    let mut statements = vec![Statement::new(
        Table::Songplay,
        "INSERT INTO no_such_table VALUES (1);",
    )];
    statements.extend(
        [
            Table::Songplay,
            Table::Users,
            Table::Songs,
            Table::Artists,
            Table::Times,
        ]
        .map(|t| Statement::new(t, insert_select(t).unwrap())),
    );
    let mut session = PgSession::connect_with(&dsn.parse()?).await?;
    let report = run_batch(&mut session, Phase::Insert, &statements).await;
    session.close().await?;

    // the broken statement must not poison the ones after it
    let failed: Vec<_> = report.failures().map(|f| f.position).collect();
    assert_eq!(failed, vec![1]);
    assert_eq!(report.succeeded(), 5);

    let plays = client
        .query(
            "SELECT start_time, user_id, song_id, artist_id, session_id FROM songplay",
            &[],
        )
        .await?;
    assert_eq!(plays.len(), 1);
    let start: NaiveDateTime = plays[0].get(0);
    assert_eq!(
        start,
        TimeParts::from_epoch_millis(1_542_241_826_796).unwrap().start_time
    );
    assert_eq!(plays[0].get::<_, String>(1), "10");
    assert_eq!(plays[0].get::<_, String>(2), "SOCREEP");
    assert_eq!(plays[0].get::<_, String>(3), "ARRH");
    assert_eq!(plays[0].get::<_, i64>(4), 100);

    // user 97 moved from free to paid; only the latest level survives
    let users: Vec<(String, String)> = client
        .query("SELECT user_id, level FROM users ORDER BY user_id", &[])
        .await?
        .iter()
        .map(|r| (r.get(0), r.get(1)))
        .collect();
    assert_eq!(
        users,
        vec![
            ("10".to_string(), "free".to_string()),
            ("11".to_string(), "paid".to_string()),
            ("97".to_string(), "paid".to_string()),
        ]
    );

    // the two ARRH records disagree on location; the located one wins
    let artists = client
        .query("SELECT artist_id, location FROM artists", &[])
        .await?;
    assert_eq!(artists.len(), 1);
    assert_eq!(artists[0].get::<_, String>(0), "ARRH");
    assert_eq!(artists[0].get::<_, Option<String>>(1).as_deref(), Some("Oxford"));

    let songs = client.query("SELECT song_id FROM songs", &[]).await?;
    assert_eq!(songs.len(), 2);

    // every qualifying event second, joined or not; the Home event is excluded
    let times = client
        .query(
            "SELECT start_time, hour, day, week, month, year, weekday FROM times ORDER BY start_time",
            &[],
        )
        .await?;
    let expected = [1_542_241_826_796_i64, 1_542_241_900_000]
        .map(|ts| TimeParts::from_epoch_millis(ts).unwrap());
    assert_eq!(times.len(), expected.len());
    for (row, want) in times.iter().zip(expected.iter()) {
        assert_eq!(row.get::<_, NaiveDateTime>(0), want.start_time);
        assert_eq!(row.get::<_, i16>(1) as u32, want.hour);
        assert_eq!(row.get::<_, i16>(2) as u32, want.day);
        assert_eq!(row.get::<_, i16>(3) as u32, want.week);
        assert_eq!(row.get::<_, i16>(4) as u32, want.month);
        assert_eq!(row.get::<_, i16>(5) as i32, want.year);
        assert_eq!(row.get::<_, i16>(6) as u32, want.weekday);
    }

    Ok(())
}

/// Rewrite the Redshift-only column and table options into plain Postgres.
fn without_redshift_hints(sql: &str) -> String {
    sql.replace("IDENTITY(0,1)", "GENERATED BY DEFAULT AS IDENTITY")
        .replace(" DISTSTYLE ALL", "")
        .replace(" DISTKEY", "")
        .replace(" SORTKEY", "")
}

#[tokio::test]
async fn drop_and_create_are_idempotent() -> Result<()> {
    let dsn = match std::env::var("DWH_TEST_DSN") {
        Ok(value) => value,
        Err(_) => return Ok(()),
    };

    let client = connect(&dsn).await?;
    client
        .batch_execute(
            "DROP SCHEMA IF EXISTS dwh_idempotency CASCADE; CREATE SCHEMA dwh_idempotency;",
        )
        .await?;

    let mut config: tokio_postgres::Config = dsn.parse()?;
    config.options("-c search_path=dwh_idempotency");

    let drops: Vec<_> = Table::ALL
        .map(|t| Statement::new(t, ddl::drop_table(t)))
        .to_vec();
    let creates: Vec<_> = Table::ALL
        .map(|t| Statement::new(t, without_redshift_hints(ddl::create_table(t))))
        .to_vec();

    let mut session = PgSession::connect_with(&config).await?;
    // the schema is empty, so every drop hits a missing table
    let dropped = run_batch(&mut session, Phase::Drop, &drops).await;
    let first = run_batch(&mut session, Phase::Create, &creates).await;
    let second = run_batch(&mut session, Phase::Create, &creates).await;
    session.close().await?;

    assert!(dropped.is_clean(), "{:?}", dropped.failures().collect::<Vec<_>>());
    assert!(first.is_clean(), "{:?}", first.failures().collect::<Vec<_>>());
    assert!(second.is_clean(), "{:?}", second.failures().collect::<Vec<_>>());

    let row = client
        .query_one(
            "SELECT COUNT(*) FROM information_schema.tables WHERE table_schema = 'dwh_idempotency'",
            &[],
        )
        .await?;
    assert_eq!(row.get::<_, i64>(0), 7);

    client
        .batch_execute("DROP SCHEMA dwh_idempotency CASCADE;")
        .await?;
    Ok(())
}

use air_quality_dashboard::analyzers::{
    DailyMean, DailyResult, MissingValuePolicy, QueryEngine, QueryOptions, QueryRequest,
    QueryResult, RangePolicy, RangedResult,
};
use air_quality_dashboard::config::Settings;
use air_quality_dashboard::error::DashboardError;
use air_quality_dashboard::models::{Dataset, Parameter, Station, WindDirection};
use air_quality_dashboard::readers::{load, DatasetLoader};
use air_quality_dashboard::writers::ParquetWriter;
use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use tempfile::TempDir;
use zip::{write::FileOptions, CompressionMethod, ZipWriter};

const COMBINED_HEADER: &str = "Datetime,station,PM2.5,PM10,SO2,NO2,CO,O3,TEMP,PRES,DEWP,RAIN,wd,WSPM";
const RAW_HEADER: &str =
    "No,year,month,day,hour,PM2.5,PM10,SO2,NO2,CO,O3,TEMP,PRES,DEWP,RAIN,wd,WSPM,station";

// (timestamp, station, PM2.5, wd)
const ROWS: [(&str, &str, &str, &str); 7] = [
    ("2013-03-01 00:00:00", "Aotizhongxin", "8", "NNW"),
    ("2017-02-26 12:00:00", "Dongsi", "50", "N"),
    ("2017-02-28 02:00:00", "Dongsi", "30", "NE"),
    ("2017-02-28 00:00:00", "Dongsi", "10", "N"),
    ("2017-02-28 01:00:00", "Dongsi", "20", "NE"),
    ("2017-02-28 01:00:00", "Aotizhongxin", "NA", "NA"),
    ("2017-02-28 05:00:00", "Aotizhongxin", "40", "SW"),
];

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn combined_csv() -> String {
    let mut csv = format!("{}\n", COMBINED_HEADER);
    for (timestamp, station, pm25, wd) in ROWS {
        csv.push_str(&format!(
            "{},{},{},5,3,20,400,60,1.5,1020.0,-10.0,0,{},2.1\n",
            timestamp, station, pm25, wd
        ));
    }
    csv
}

fn raw_csv(station_filter: Option<&str>) -> String {
    let mut csv = format!("{}\n", RAW_HEADER);
    for (i, (timestamp, station, pm25, wd)) in ROWS.iter().enumerate() {
        if station_filter.is_some_and(|s| s != *station) {
            continue;
        }
        let (day, time) = timestamp.split_once(' ').unwrap();
        let parts: Vec<u32> = day.split('-').map(|p| p.parse().unwrap()).collect();
        let hour: u32 = time[..2].parse().unwrap();
        csv.push_str(&format!(
            "{},{},{},{},{},{},5,3,20,400,60,1.5,1020.0,-10.0,0,{},2.1,{}\n",
            i + 1,
            parts[0],
            parts[1],
            parts[2],
            hour,
            pm25,
            wd,
            station
        ));
    }
    csv
}

fn write_file(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

fn load_fixture(dir: &TempDir) -> Dataset {
    load(&write_file(dir, "all_df.csv", &combined_csv())).unwrap()
}

fn engine_with(dataset: Dataset, options: QueryOptions) -> QueryEngine {
    QueryEngine::new(Arc::new(dataset), options)
}

#[test]
fn test_daily_slice_from_csv() {
    let dir = TempDir::new().unwrap();
    let engine = QueryEngine::with_defaults(Arc::new(load_fixture(&dir)));

    let result = engine
        .daily_slice(Station::Dongsi, date(2017, 2, 28), Parameter::Pm25.spec())
        .unwrap();

    let DailyResult::Numeric(slice) = result else {
        panic!("expected a numeric slice");
    };
    assert_eq!(slice.mean, Some(20.0));
    let values: Vec<f64> = slice.series.iter().map(|p| p.value).collect();
    assert_eq!(values, vec![10.0, 20.0, 30.0]);
    assert!(slice
        .series
        .windows(2)
        .all(|w| w[0].timestamp < w[1].timestamp));
}

#[test]
fn test_daily_wind_direction_frequencies() {
    let dir = TempDir::new().unwrap();
    let engine = QueryEngine::with_defaults(Arc::new(load_fixture(&dir)));

    let result = engine
        .execute(&QueryRequest::Daily {
            station: Station::Dongsi,
            day: date(2017, 2, 28),
            parameter: "Wind Direction".to_string(),
        })
        .unwrap();

    let QueryResult::Daily(DailyResult::Frequencies(counts)) = result else {
        panic!("expected frequencies");
    };
    assert_eq!(counts[0].category, WindDirection::NE);
    assert_eq!(counts[0].count, 2);
    assert_eq!(counts[1].category, WindDirection::N);
    assert_eq!(counts[1].count, 1);
}

#[test]
fn test_ranged_series_is_sparse() {
    let dir = TempDir::new().unwrap();
    let engine = QueryEngine::with_defaults(Arc::new(load_fixture(&dir)));

    let result = engine
        .ranged_series(
            Station::Dongsi,
            date(2017, 2, 26),
            date(2017, 2, 28),
            Parameter::Pm25.spec(),
        )
        .unwrap();

    assert_eq!(
        result,
        RangedResult::Daily(vec![
            DailyMean {
                date: date(2017, 2, 26),
                mean: 50.0,
                count: 1,
            },
            DailyMean {
                date: date(2017, 2, 28),
                mean: 20.0,
                count: 3,
            },
        ])
    );

    let single = engine
        .ranged_series(
            Station::Aotizhongxin,
            date(2013, 3, 1),
            date(2013, 3, 2),
            Parameter::Pm25.spec(),
        )
        .unwrap();
    let RangedResult::Daily(points) = single else {
        panic!("expected daily means");
    };
    assert_eq!(points.len(), 1);
}

#[test]
fn test_ranking_and_missing_value_policies() {
    let dir = TempDir::new().unwrap();

    let exclude = engine_with(load_fixture(&dir), QueryOptions::default());
    let ranking = exclude.station_ranking(Parameter::Pm25.spec()).unwrap();
    assert_eq!(ranking.len(), 2);
    assert_eq!(ranking[0].station, Station::Dongsi);
    assert_eq!(ranking[0].mean, 27.5);
    assert!(ranking[0].is_max);
    assert_eq!(ranking[1].station, Station::Aotizhongxin);
    assert_eq!(ranking[1].mean, 24.0);
    assert!(!ranking[1].is_max);

    let zero = engine_with(
        load_fixture(&dir),
        QueryOptions {
            missing_values: MissingValuePolicy::Zero,
            ..QueryOptions::default()
        },
    );
    let ranking = zero.station_ranking(Parameter::Pm25.spec()).unwrap();
    assert_eq!(ranking[1].station, Station::Aotizhongxin);
    assert_eq!(ranking[1].mean, 16.0);
    assert_eq!(ranking[1].count, 3);
}

#[test]
fn test_weekday_weekend_comparison() {
    let dir = TempDir::new().unwrap();
    let engine = QueryEngine::with_defaults(Arc::new(load_fixture(&dir)));

    let comparison = engine
        .weekday_weekend_comparison(Parameter::Pm25.spec())
        .unwrap();

    assert_eq!(comparison.len(), 2);
    assert_eq!(comparison[0].station, Station::Aotizhongxin);
    assert_eq!(comparison[0].weekday_mean, Some(24.0));
    assert_eq!(comparison[0].weekend_mean, None);
    assert_eq!(comparison[1].station, Station::Dongsi);
    assert_eq!(comparison[1].weekday_mean, Some(20.0));
    assert_eq!(comparison[1].weekend_mean, Some(50.0));

    let err = engine
        .weekday_weekend_comparison(Parameter::WindDirection.spec())
        .unwrap_err();
    assert!(matches!(err, DashboardError::UnsupportedAggregation { .. }));
}

#[test]
fn test_raw_layout_matches_combined_layout() {
    let dir = TempDir::new().unwrap();
    let combined = load(&write_file(&dir, "all_df.csv", &combined_csv())).unwrap();
    let raw = load(&write_file(&dir, "raw.csv", &raw_csv(None))).unwrap();

    assert_eq!(raw.records(), combined.records());
    assert_eq!(raw.coverage(), combined.coverage());
    assert!(raw.records()[5].pm25.is_none());
    assert!(raw.records()[5].wind_direction.is_none());
}

#[test]
fn test_missing_column_aborts_load() {
    let dir = TempDir::new().unwrap();
    let csv = combined_csv().replace(",O3,", ",OZONE,");
    let err = load(&write_file(&dir, "broken.csv", &csv)).unwrap_err();

    assert!(err.is_load_error());
    assert!(matches!(err, DashboardError::MissingColumn { column } if column == "O3"));

    let err = load(&write_file(&dir, "notes.txt", "hello")).unwrap_err();
    assert!(matches!(err, DashboardError::UnsupportedSource(_)));
}

#[test]
fn test_zip_source_loads_all_stations() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("PRSA2017_Data_20130301-20170228.zip");
    {
        let mut zip = ZipWriter::new(fs::File::create(&path).unwrap());
        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
        for station in ["Dongsi", "Aotizhongxin"] {
            zip.start_file(
                format!("PRSA_Data_20130301-20170228/PRSA_Data_{}_20130301-20170228.csv", station),
                options,
            )
            .unwrap();
            zip.write_all(raw_csv(Some(station)).as_bytes()).unwrap();
        }
        zip.finish().unwrap();
    }

    let dataset = load(&path).unwrap();
    assert_eq!(dataset.len(), ROWS.len());
    assert_eq!(dataset.stations(), vec![Station::Aotizhongxin, Station::Dongsi]);
    assert_eq!(dataset.station_count(Station::Dongsi), 4);
    assert_eq!(
        dataset.date_coverage(),
        Some((date(2013, 3, 1), date(2017, 2, 28)))
    );
}

#[test]
fn test_parquet_export_round_trips_through_loader() {
    let dir = TempDir::new().unwrap();
    let dataset = load_fixture(&dir);

    let output = dir.path().join("air-quality.parquet");
    let writer = ParquetWriter::new().with_compression("zstd").unwrap();
    writer.write_records(dataset.records(), &output).unwrap();
    assert_eq!(
        writer.get_file_info(&output).unwrap().total_rows,
        ROWS.len() as i64
    );

    let reloaded = load(&output).unwrap();
    assert_eq!(reloaded.records(), dataset.records());

    let original = QueryEngine::with_defaults(Arc::new(dataset));
    let restored = QueryEngine::with_defaults(Arc::new(reloaded));
    let request = QueryRequest::Ranking {
        pollutant: "PM2.5".to_string(),
    };
    assert_eq!(
        original.execute(&request).unwrap(),
        restored.execute(&request).unwrap()
    );
}

#[test]
fn test_range_policies_at_coverage_edges() {
    let dir = TempDir::new().unwrap();
    let outside = date(2018, 1, 1);

    let intersect = engine_with(load_fixture(&dir), QueryOptions::default());
    assert_eq!(
        intersect
            .daily_slice(Station::Dongsi, outside, Parameter::Pm25.spec())
            .unwrap(),
        DailyResult::Empty
    );

    let strict = engine_with(
        load_fixture(&dir),
        QueryOptions {
            range_policy: RangePolicy::Strict,
            ..QueryOptions::default()
        },
    );
    let err = strict
        .daily_slice(Station::Dongsi, outside, Parameter::Pm25.spec())
        .unwrap_err();
    assert!(matches!(err, DashboardError::InvalidRange { .. }));
    assert!(!err.is_load_error());

    let clamp = engine_with(
        load_fixture(&dir),
        QueryOptions {
            range_policy: RangePolicy::Clamp,
            ..QueryOptions::default()
        },
    );
    let clamped = clamp
        .ranged_series(
            Station::Dongsi,
            date(2017, 2, 27),
            outside,
            Parameter::Pm25.spec(),
        )
        .unwrap();
    let RangedResult::Daily(points) = clamped else {
        panic!("expected daily means");
    };
    assert_eq!(points.len(), 1);
    assert_eq!(points[0].date, date(2017, 2, 28));
}

#[test]
fn test_unknown_parameter_is_rejected() {
    let dir = TempDir::new().unwrap();
    let engine = QueryEngine::with_defaults(Arc::new(load_fixture(&dir)));

    let err = engine
        .execute(&QueryRequest::Ranking {
            pollutant: "Humidity".to_string(),
        })
        .unwrap_err();
    assert!(matches!(err, DashboardError::UnknownParameter { label } if label == "Humidity"));
}

#[test]
fn test_concurrent_queries_share_dataset() {
    let dir = TempDir::new().unwrap();
    let dataset = Arc::new(load_fixture(&dir));
    let expected = QueryEngine::with_defaults(Arc::clone(&dataset))
        .station_ranking(Parameter::Pm25.spec())
        .unwrap();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let dataset = Arc::clone(&dataset);
            thread::spawn(move || {
                QueryEngine::with_defaults(dataset)
                    .station_ranking(Parameter::Pm25.spec())
                    .unwrap()
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), expected);
    }
}

#[test]
fn test_loader_from_settings_file() {
    let dir = TempDir::new().unwrap();
    let dataset_path = write_file(&dir, "all_df.csv", &combined_csv());
    let config_path = write_file(
        &dir,
        "aq-dashboard.toml",
        &format!(
            "dataset_path = {:?}\nuse_mmap = true\nmax_workers = 2\nmissing_values = \"zero\"\n",
            dataset_path.display().to_string()
        ),
    );

    let settings = Settings::load(Some(Path::new(&config_path))).unwrap();
    assert!(settings.use_mmap);

    let dataset = DatasetLoader::from_settings(&settings)
        .load(&settings.dataset_path)
        .unwrap();
    let engine = engine_with(dataset, settings.query_options());

    let ranking = engine.station_ranking(Parameter::Pm25.spec()).unwrap();
    assert_eq!(ranking[1].mean, 16.0);
}

// Moving-average UDTF run end to end: executor, output pipeline, channel sink

use anyhow::Result;
use clap::Parser;
use log::info;
use std::collections::VecDeque;
use std::path::PathBuf;
use udtf_collector::config::{Settings, load_settings};
use udtf_collector::prelude::*;
use udtf_collector::util::logging;

/// Command line arguments for the moving average example
#[derive(Parser, Debug)]
#[command(name = "moving_average", about = "Moving average UDTF example")]
struct Args {
    /// Optional path to a settings file (toml, json or yaml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of rows averaged per output point
    #[arg(short, long, default_value = "5")]
    window: usize,

    /// Number of synthetic input rows
    #[arg(short, long, default_value = "50")]
    rows: usize,

    /// Use tumbling size windows instead of row-by-row delivery
    #[arg(long)]
    tumbling: bool,
}

/// Averages the last `window` values of a DOUBLE series
struct MovingAverage {
    window: usize,
    tumbling: bool,
    recent: VecDeque<f64>,
}

impl Udtf for MovingAverage {
    fn name(&self) -> &str {
        "moving_average"
    }

    fn validate(&self, parameters: &UdfParameters) -> udtf_collector::error::Result<()> {
        if parameters.input_count() != 1 {
            return Err(CollectorError::Udf("expects exactly one input series".to_string()));
        }
        Ok(())
    }

    fn before_start(
        &mut self,
        parameters: &UdfParameters,
        configurations: &mut UdtfConfigurations,
    ) -> udtf_collector::error::Result<()> {
        let default = i64::try_from(self.window).unwrap_or(i64::MAX);
        let window = parameters.get_long_or("window", default)?.max(1);
        self.window = usize::try_from(window).unwrap_or(usize::MAX);
        configurations.set_output_data_type(DataType::Double);
        if self.tumbling {
            configurations.set_access_strategy(AccessStrategy::size_window(self.window));
        }
        Ok(())
    }

    fn transform(
        &mut self,
        row: &Row,
        collector: &mut dyn PointCollector,
    ) -> udtf_collector::error::Result<()> {
        let Some(value) = row.value(0).and_then(Value::as_f64) else {
            return Ok(());
        };

        self.recent.push_back(value);
        if self.recent.len() > self.window {
            self.recent.pop_front();
        }
        if self.recent.len() == self.window {
            let mean = self.recent.iter().sum::<f64>() / self.window as f64;
            collector.put_double(row.timestamp, mean)?;
        }
        Ok(())
    }

    fn transform_window(
        &mut self,
        window: &RowWindow<'_>,
        collector: &mut dyn PointCollector,
    ) -> udtf_collector::error::Result<()> {
        let values: Vec<f64> = window
            .rows()
            .iter()
            .filter_map(|r| r.value(0).and_then(Value::as_f64))
            .collect();
        if values.is_empty() {
            return Ok(());
        }
        let mean = values.iter().sum::<f64>() / values.len() as f64;
        collector.put_double(window.window_start_time(), mean)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let settings = match &args.config {
        Some(path) => load_settings(path)?,
        None => Settings::default(),
    };
    logging::try_init(&settings.log_level);

    let rows: Vec<Row> = (0..args.rows as i64)
        .map(|t| Row::single(t * 1000, Value::Double((t as f64 / 5.0).sin() * 10.0)))
        .collect();

    let parameters = UdfParameters::new()
        .with_input("root.demo.sensor.temperature", DataType::Double)
        .with_attribute("window", args.window.to_string());

    let mut udtf = MovingAverage {
        window: args.window,
        tumbling: args.tumbling,
        recent: VecDeque::new(),
    };

    let executor = UdtfExecutor::from_settings(&settings.collector);
    let batch = executor.execute(&mut udtf, &parameters, &rows, "root.demo.sensor.avg")?;

    let (sink, mut receiver) = ChannelSink::new("stdout", 16);
    let printer = tokio::spawn(async move {
        while let Some(batch) = receiver.recv().await {
            for point in &batch.points {
                println!("{}", point.to_json());
            }
        }
    });

    let pipeline = OutputPipeline::from_settings(sink, &settings);
    pipeline.accept(batch)?;
    let written = pipeline.flush().await?;
    info!("Wrote {} averaged points", written);

    drop(pipeline);
    printer.await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn averager(window: usize) -> MovingAverage {
        MovingAverage {
            window,
            tumbling: false,
            recent: VecDeque::new(),
        }
    }

    #[test]
    fn test_window_wider_than_i32_is_kept() {
        let wide = i32::MAX as usize + 1;

        let mut udtf = averager(wide);
        udtf.before_start(&UdfParameters::new(), &mut UdtfConfigurations::new())
            .unwrap();
        assert_eq!(udtf.window, wide);

        let parameters = UdfParameters::new().with_attribute("window", wide.to_string());
        let mut udtf = averager(5);
        udtf.before_start(&parameters, &mut UdtfConfigurations::new())
            .unwrap();
        assert_eq!(udtf.window, wide);

        let parameters = UdfParameters::new().with_attribute("window", "0");
        udtf.before_start(&parameters, &mut UdtfConfigurations::new())
            .unwrap();
        assert_eq!(udtf.window, 1);
    }
}

use udtf_collector::prelude::*;

/// Emits the input string with its length prefixed, as TEXT
struct Labeller {
    as_binary: bool,
    emitted: usize,
}

impl Udtf for Labeller {
    fn name(&self) -> &str {
        "labeller"
    }

    fn before_start(
        &mut self,
        parameters: &UdfParameters,
        configurations: &mut UdtfConfigurations,
    ) -> Result<()> {
        self.as_binary = parameters.get_boolean_or("binary", false)?;
        configurations.set_output_data_type(DataType::Text);
        Ok(())
    }

    fn transform(&mut self, row: &Row, collector: &mut dyn PointCollector) -> Result<()> {
        if row.is_null(0) {
            return Ok(());
        }
        let text = row.value(0).and_then(Value::as_text).unwrap_or_default();
        let label = format!("{}:{}", text.len(), text);
        self.emitted += 1;
        if self.as_binary {
            collector.put_binary(row.timestamp, Binary::from(label))
        } else {
            collector.put_string(row.timestamp, &label)
        }
    }

    fn terminate(&mut self, collector: &mut dyn PointCollector) -> Result<()> {
        collector.put_string(i64::MAX, &format!("total={}", self.emitted))
    }
}

fn input() -> Vec<Row> {
    vec![
        Row::single(10, Value::Text("a".to_string())),
        Row::new(20, vec![None]),
        Row::single(30, Value::Text("abc".to_string())),
    ]
}

#[tokio::test]
async fn test_text_udtf_end_to_end() {
    let mut udtf = Labeller {
        as_binary: false,
        emitted: 0,
    };
    let parameters = UdfParameters::new().with_input("root.sg.d.s", DataType::Text);

    let batch = UdtfExecutor::new()
        .execute(&mut udtf, &parameters, &input(), "root.sg.d.labels")
        .unwrap();
    assert_eq!(batch.data_type, DataType::Text);

    let pipeline = OutputPipeline::new(MemorySink::new("memory"));
    pipeline.accept(batch).unwrap();
    assert_eq!(pipeline.flush().await.unwrap(), 3);

    let stored = pipeline.sink().points("root.sg.d.labels").unwrap();
    let texts: Vec<String> = stored.iter().filter_map(|p| p.value.as_text()).collect();
    assert_eq!(texts, vec!["1:a", "3:abc", "total=2"]);
    assert_eq!(stored[2].timestamp, i64::MAX);
}

#[tokio::test]
async fn test_binary_output_and_channel_sink() {
    let mut udtf = Labeller {
        as_binary: true,
        emitted: 0,
    };
    let parameters = UdfParameters::new()
        .with_input("root.sg.d.s", DataType::Text)
        .with_attribute("binary", "true");

    let batch = UdtfExecutor::new()
        .execute(&mut udtf, &parameters, &input(), "labels")
        .unwrap();
    assert!(matches!(batch.points[0].value, Value::Binary(_)));

    let (sink, mut receiver) = ChannelSink::new("channel", 4);
    let pipeline = OutputPipeline::new(sink);
    pipeline.accept(batch).unwrap();
    pipeline.flush().await.unwrap();

    let received = receiver.recv().await.unwrap();
    assert_eq!(received.series, "labels");
    assert_eq!(received.len(), 3);
    assert_eq!(received.points[0].to_json()["value"], "1:a");
}

#[test]
fn test_settings_drive_executor_ordering() {
    let settings = SettingsBuilder::new()
        .add_toml("[collector]\nordering = \"unordered\"\ncapacity = 10")
        .build()
        .unwrap();
    let executor = UdtfExecutor::from_settings(&settings.collector);

    /// Emits points newest first, which only an unordered collector accepts
    struct Reverser;

    impl Udtf for Reverser {
        fn name(&self) -> &str {
            "reverser"
        }

        fn before_start(
            &mut self,
            _parameters: &UdfParameters,
            configurations: &mut UdtfConfigurations,
        ) -> Result<()> {
            configurations
                .set_output_data_type(DataType::Int32)
                .set_access_strategy(AccessStrategy::size_window(3));
            Ok(())
        }

        fn transform_window(
            &mut self,
            window: &RowWindow<'_>,
            collector: &mut dyn PointCollector,
        ) -> Result<()> {
            for row in window.rows().iter().rev() {
                collector.put_int(row.timestamp, row.timestamp as i32)?;
            }
            Ok(())
        }
    }

    let rows: Vec<Row> = (1..=3).map(|t| Row::single(t, Value::Int32(0))).collect();
    let batch = executor
        .execute(&mut Reverser, &UdfParameters::new(), &rows, "r")
        .unwrap();
    let timestamps: Vec<i64> = batch.points.iter().map(|p| p.timestamp).collect();
    assert_eq!(timestamps, vec![1, 2, 3]);

    let strict = UdtfExecutor::new().execute(&mut Reverser, &UdfParameters::new(), &rows, "r");
    assert!(matches!(strict, Err(CollectorError::OutOfOrder { .. })));
}

use spark_detect::{BoundingBox, DetectionFrame, RawDetection};
use spark_navigator::navigate::decision::NavigationDecision;
use spark_navigator::navigate::pattern::{BlockPattern, RESUME_CODE};
use spark_navigator::navigate::property::direction::Direction;
use spark_navigator::navigate::property::distance::CalibrationProfile;
use spark_navigator::{CommandDispatcher, NavigationEngine, NavigatorConfig};
use spark_transport::recording::{
    Recorded, RecordingAnnouncer, RecordingLink, RecordingMotionSink,
};
use spark_transport::MotionCommand;
use std::time::Duration;
use tokio::time::Instant;

const MOVING: u8 = 0;
const STATIC: u8 = 1;

fn boxed(class_id: u8, track_id: u32, x1: f32, width: f32) -> RawDetection {
    RawDetection::new(
        class_id,
        Some(track_id),
        BoundingBox::new(x1, 120.0, x1 + width, 360.0),
    )
}

fn frame(index: u64, detections: Vec<RawDetection>) -> DetectionFrame {
    DetectionFrame::new(index, detections).with_size(640, 480)
}

fn dispatcher_for(
    link: &RecordingLink,
    engine: &NavigationEngine,
) -> CommandDispatcher<RecordingMotionSink, RecordingAnnouncer> {
    CommandDispatcher::new(link.motion_sink(), link.announcer(), engine.sequence())
}

fn announce(code: &str, sequence_id: Option<u32>) -> Recorded {
    Recorded::Announce {
        code: code.to_string(),
        sequence_id,
    }
}

#[test]
fn far_moving_obstacle_does_not_stop() {
    let mut engine = NavigationEngine::new(&NavigatorConfig::default());
    // 35 * 600 / 70 = 300cm.
    let maneuvers = engine.process_frame(
        &frame(1, vec![boxed(MOVING, 1, 100.0, 70.0)]),
        Instant::now(),
    );
    assert!(maneuvers.is_empty());
}

#[tokio::test(start_paused = true)]
async fn near_moving_obstacle_on_the_right_steers_right() -> anyhow::Result<()> {
    let link = RecordingLink::new();
    let mut engine = NavigationEngine::new(&NavigatorConfig::default());
    let dispatcher = dispatcher_for(&link, &engine);

    // 35 * 600 / 233.33 = 90cm, centroid 216 is left of 320 -> Right.
    let maneuvers = engine.process_frame(
        &frame(1, vec![boxed(MOVING, 7, 100.0, 21000.0 / 90.0)]),
        Instant::now(),
    );
    assert_eq!(maneuvers.len(), 1);
    assert_eq!(
        maneuvers[0].decision,
        NavigationDecision::StopAndSteer {
            direction: Direction::Right,
            pattern: BlockPattern::SteerRight
        }
    );

    // Nothing has been sent yet, so the id has not moved.
    assert_eq!(engine.sequence_id(), 1);

    let start = Instant::now();
    dispatcher.execute(&maneuvers[0]).await?;

    assert_eq!(
        link.events(),
        vec![
            Recorded::Motion(MotionCommand::STOP),
            announce("A55A21020N01P02P00P02", None),
            Recorded::Motion(MotionCommand {
                sequence_id: 1,
                lateral: 1000,
                forward: 0,
                rotation: 0
            }),
            announce(RESUME_CODE, Some(2)),
        ]
    );

    let offsets: Vec<_> = link
        .timed_events()
        .iter()
        .map(|(at, _)| at.duration_since(start))
        .collect();
    assert_eq!(
        offsets,
        vec![
            Duration::ZERO,
            Duration::ZERO,
            Duration::from_secs(5),
            Duration::from_secs(10)
        ]
    );
    assert_eq!(engine.sequence_id(), 2);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn near_moving_obstacle_on_the_left_steers_left() -> anyhow::Result<()> {
    let link = RecordingLink::new();
    let mut engine = NavigationEngine::new(&NavigatorConfig::default());
    let dispatcher = dispatcher_for(&link, &engine);

    // Exactly 100cm, centroid 505 -> Left; the left-hand steer is inclusive.
    let maneuvers = engine.process_frame(
        &frame(1, vec![boxed(MOVING, 2, 400.0, 210.0)]),
        Instant::now(),
    );
    assert_eq!(maneuvers.len(), 1);
    dispatcher.execute(&maneuvers[0]).await?;

    assert_eq!(link.motions()[1], MotionCommand::lateral(1, -1000));
    assert_eq!(
        link.announcements(),
        vec![
            ("A55A21020P00P02P01P02".to_string(), None),
            (RESUME_CODE.to_string(), Some(2)),
        ]
    );
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn congested_pair_blocks_the_middle_lane() -> anyhow::Result<()> {
    let mut config = NavigatorConfig::default();
    // 95 * 300 / 300px = 95cm.
    config.calibration.stationary = CalibrationProfile::new(95.0, 300.0);

    let link = RecordingLink::new();
    let mut engine = NavigationEngine::new(&config);
    let dispatcher = dispatcher_for(&link, &engine);

    // Centroids 310 and 710: gap 400. The first box is mid-zone and 300px wide.
    let maneuvers = engine.process_frame(
        &frame(
            1,
            vec![boxed(STATIC, 1, 160.0, 300.0), boxed(STATIC, 2, 660.0, 100.0)],
        ),
        Instant::now(),
    );

    let decisions: Vec<_> = maneuvers.iter().map(|m| (m.track_id, m.decision)).collect();
    assert_eq!(
        decisions,
        vec![
            (1, NavigationDecision::StopOnly),
            (1, NavigationDecision::StopAndBlock(BlockPattern::MidNarrow)),
        ]
    );

    assert_eq!(dispatcher.execute_all(&maneuvers).await, 0);
    assert_eq!(
        link.events(),
        vec![
            Recorded::Motion(MotionCommand::STOP),
            announce(RESUME_CODE, None),
            Recorded::Motion(MotionCommand::STOP),
            announce("A55A21020P00P02P00P03", None),
            announce(RESUME_CODE, None),
        ]
    );
    assert_eq!(engine.sequence_id(), 1);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn static_obstacle_at_one_meter_stops() -> anyhow::Result<()> {
    let link = RecordingLink::new();
    let mut engine = NavigationEngine::new(&NavigatorConfig::default());
    let dispatcher = dispatcher_for(&link, &engine);

    // 35 * 630 / 220.5 = 100cm exactly.
    let maneuvers = engine.process_frame(
        &frame(1, vec![boxed(STATIC, 4, 50.0, 220.5)]),
        Instant::now(),
    );
    assert_eq!(maneuvers.len(), 1);
    assert_eq!(maneuvers[0].decision, NavigationDecision::StopOnly);

    let start = Instant::now();
    dispatcher.execute(&maneuvers[0]).await?;
    assert_eq!(
        link.events(),
        vec![
            Recorded::Motion(MotionCommand::STOP),
            announce(RESUME_CODE, None)
        ]
    );
    assert_eq!(Instant::now().duration_since(start), Duration::from_secs(5));
    assert_eq!(engine.sequence_id(), 1);
    Ok(())
}

#[test]
fn clear_frames_leave_sequence_id_alone() {
    let mut engine = NavigationEngine::new(&NavigatorConfig::default());
    let start = Instant::now();
    for i in 0..50u64 {
        let maneuvers = engine.process_frame(
            &frame(i, vec![boxed(MOVING, 1, 10.0, 60.0), boxed(STATIC, 2, 500.0, 40.0)]),
            start + Duration::from_millis(i * 40),
        );
        assert!(maneuvers.is_empty());
    }
    assert_eq!(engine.sequence_id(), 1);
}

#[test]
fn untracked_and_unknown_detections_never_trigger() {
    let mut engine = NavigationEngine::new(&NavigatorConfig::default());
    let near = BoundingBox::new(100.0, 100.0, 400.0, 300.0);
    let maneuvers = engine.process_frame(
        &frame(
            1,
            vec![
                RawDetection::new(MOVING, None, near),
                RawDetection::new(3, Some(9), near),
            ],
        ),
        Instant::now(),
    );
    assert!(maneuvers.is_empty());
}

#[tokio::test(start_paused = true)]
async fn aborted_steer_keeps_the_sequence_id() -> anyhow::Result<()> {
    let link = RecordingLink::new();
    let mut engine = NavigationEngine::new(&NavigatorConfig::default());
    let dispatcher = dispatcher_for(&link, &engine);
    let maneuvers = engine.process_frame(
        &frame(1, vec![boxed(MOVING, 7, 100.0, 21000.0 / 90.0)]),
        Instant::now(),
    );

    link.fail_motion(true);
    assert!(dispatcher.execute(&maneuvers[0]).await.is_err());
    assert!(link.events().is_empty());
    assert_eq!(engine.sequence_id(), 1);

    link.fail_motion(false);
    link.fail_announce(true);
    assert!(dispatcher.execute(&maneuvers[0]).await.is_err());
    assert_eq!(link.events(), vec![Recorded::Motion(MotionCommand::STOP)]);
    assert_eq!(engine.sequence_id(), 1);

    link.clear();
    link.fail_announce(false);
    dispatcher.execute(&maneuvers[0]).await?;
    assert_eq!(link.motions()[1], MotionCommand::lateral(1, 1000));
    assert_eq!(engine.sequence_id(), 2);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn completed_steer_advances_even_if_resume_is_lost() {
    let link = RecordingLink::new();
    let config = NavigatorConfig::default();
    let mut engine = NavigationEngine::new(&config);
    let dispatcher = dispatcher_for(&link, &engine);
    let maneuvers = engine.process_frame(
        &frame(1, vec![boxed(MOVING, 7, 100.0, 21000.0 / 90.0)]),
        Instant::now(),
    );

    // Let the stop and pattern out, then lose the link before the resume.
    let outage = link.clone();
    let settle = config.maneuver.settle();
    let cut = tokio::spawn(async move {
        tokio::time::sleep(settle + settle / 2).await;
        outage.fail_announce(true);
    });

    assert!(dispatcher.execute(&maneuvers[0]).await.is_err());
    cut.await.expect("outage task");
    assert_eq!(link.motions(), vec![MotionCommand::STOP, MotionCommand::lateral(1, 1000)]);
    assert_eq!(engine.sequence_id(), 2);
}

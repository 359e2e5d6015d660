//! Connect / render / poll / disconnect against a simulated display

mod common;

use common::{cursor_frame, keys_frame, probes, shown_cells, DeviceModel};
use nattiq_braille::profile::identity;
use nattiq_braille::{
    BrailleDriver, BrailleError, CellCount, InputEvent, KeyTableId, PollResult, ProtocolSet,
    RenderOutcome,
};

#[test]
fn note_device_is_identified_after_mokey_probe() {
    let model = DeviceModel::default()
        .identity(identity::NOTE.id1, identity::NOTE.id2)
        .cells(40);
    let (channel, handle) = model.attach();
    let channel = channel.resource_name("Note 40");

    let driver = BrailleDriver::construct(Box::new(channel), &ProtocolSet::builtin()).unwrap();

    assert_eq!(driver.model_name(), "Nattiq Note");
    assert_eq!(driver.identity(), Some(identity::NOTE));
    assert_eq!(driver.key_table(), KeyTableId::Note);
    assert_eq!(driver.cell_count(), CellCount::Reported(40));
    assert_eq!(
        probes(&handle),
        vec![
            (identity::MOKEY.id1, identity::MOKEY.id2),
            (identity::NOTE.id1, identity::NOTE.id2)
        ]
    );
    assert_eq!(shown_cells(&handle), vec![vec![0; 40]]);
}

#[test]
fn mokey_identity_wins_regardless_of_note() {
    let model = DeviceModel::default()
        .identity(identity::MOKEY.id1, identity::MOKEY.id2)
        .cells(32);
    let (channel, handle) = model.attach();

    let driver = BrailleDriver::construct(Box::new(channel), &ProtocolSet::builtin()).unwrap();

    assert_eq!(driver.identity(), Some(identity::MOKEY));
    assert_eq!(driver.key_table(), KeyTableId::Mokey);
    assert_eq!(probes(&handle).len(), 1);
}

#[test]
fn silent_device_falls_back_to_wildcard_and_default_cells() {
    let (channel, handle) = DeviceModel::default().attach();

    let driver = BrailleDriver::construct(Box::new(channel), &ProtocolSet::builtin()).unwrap();

    assert_eq!(driver.identity().map(|i| i.is_wildcard()), Some(true));
    assert_eq!(driver.key_table(), KeyTableId::Note);
    assert_eq!(driver.cell_count(), CellCount::Default(32));
    assert_eq!(shown_cells(&handle), vec![vec![0; 32]]);
}

#[test]
fn render_is_suppressed_when_unchanged() {
    let (channel, handle) = DeviceModel::default().cells(4).attach();
    let mut driver =
        BrailleDriver::construct(Box::new(channel), &ProtocolSet::builtin()).unwrap();
    handle.clear_written();

    let cells = [0x01, 0x03, 0x07, 0x0F];
    assert_eq!(
        driver.write_window(&cells).unwrap(),
        RenderOutcome::Transmitted
    );
    assert_eq!(driver.write_window(&cells).unwrap(), RenderOutcome::Unchanged);
    assert_eq!(shown_cells(&handle), vec![cells.to_vec()]);
    assert_eq!(driver.previous_cells(), &cells);

    assert!(matches!(
        driver.write_window(&[0; 5]),
        Err(BrailleError::CellCountMismatch { .. })
    ));
}

#[test]
fn transmit_failure_is_reported_and_retried_next_time() {
    let (channel, handle) = DeviceModel::default().cells(2).attach();
    let mut driver =
        BrailleDriver::construct(Box::new(channel), &ProtocolSet::builtin()).unwrap();

    handle.fail_writes(true);
    assert!(driver.write_window(&[1, 1]).is_err());
    handle.fail_writes(false);
    assert_eq!(
        driver.write_window(&[1, 1]).unwrap(),
        RenderOutcome::Transmitted
    );
}

#[test]
fn key_events_are_decoded_in_order() {
    let (channel, handle) = DeviceModel::default().cells(20).attach();
    let mut driver =
        BrailleDriver::construct(Box::new(channel), &ProtocolSet::builtin()).unwrap();

    handle.push_inbound(&cursor_frame(5));
    handle.push_inbound(&[0x00; 6]);
    handle.push_inbound(&keys_frame([0x01, 0x00, 0x00, 0x00]));

    assert_eq!(
        driver.read_command(),
        PollResult::Event(InputEvent::RoutingKeyPress { index: 5 })
    );
    assert_eq!(
        driver.read_command(),
        PollResult::Event(InputEvent::NavigationKeySet { bits: 0x0000_0001 })
    );
    assert_eq!(driver.read_command(), PollResult::NoEvent);
}

#[test]
fn read_failure_requests_restart() {
    let (channel, handle) = DeviceModel::default().cells(20).attach();
    let mut driver =
        BrailleDriver::construct(Box::new(channel), &ProtocolSet::builtin()).unwrap();

    handle.fail_reads(true);
    assert_eq!(driver.read_command(), PollResult::RestartRequested);
}

#[test]
fn construction_failure_closes_channel_once() {
    let (channel, handle) = DeviceModel::default().cells(20).attach();
    handle.fail_writes(true);

    let result = BrailleDriver::construct(Box::new(channel), &ProtocolSet::builtin());

    assert!(matches!(result, Err(BrailleError::Transport(_))));
    assert_eq!(handle.close_count(), 1);
}

#[test]
fn destruct_releases_channel_once() {
    let (channel, handle) = DeviceModel::default().cells(20).attach();
    let driver = BrailleDriver::construct(Box::new(channel), &ProtocolSet::builtin()).unwrap();

    driver.destruct().unwrap();

    assert_eq!(handle.close_count(), 1);
    assert!(handle.is_closed());
}

#[test]
fn drivers_are_independent() {
    let (first, first_handle) = DeviceModel::default().cells(10).attach();
    let (second, second_handle) = DeviceModel::default().cells(20).attach();
    let protocols = ProtocolSet::builtin();

    let mut a = BrailleDriver::construct(Box::new(first), &protocols).unwrap();
    let b = BrailleDriver::construct(Box::new(second), &protocols).unwrap();
    a.write_window(&[0xFF; 10]).unwrap();

    assert_eq!(a.text_columns(), 10);
    assert_eq!(b.text_columns(), 20);
    assert_eq!(shown_cells(&first_handle).len(), 2);
    assert_eq!(shown_cells(&second_handle).len(), 1);
}

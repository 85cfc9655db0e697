use std::fs;
use std::os::unix::fs::MetadataExt as _;
use std::os::unix::fs::PermissionsExt as _;
use std::path::Path;
use std::sync::{Arc, Mutex};

use turntable::adapters::ServiceManager;
use turntable::constants::{
    CRON_BLOCK_BEGIN, CRON_BLOCK_END, CRON_BLOCK_INNER, LEGACY_AUTOSTART_FILE,
    LEGACY_LAUNCHER_DESKTOP_FILE, UPDATER_DESKTOP_FILE,
};
use turntable::logging::JsonlSink;
use turntable::migrations::v0_8_0;
use turntable::types::errors::Result;
use turntable::types::GuiUser;
use turntable::Pipeline;

#[derive(Default)]
struct RecordingManager {
    calls: Mutex<Vec<String>>,
}

impl ServiceManager for RecordingManager {
    fn daemon_reload(&self) -> Result<()> {
        self.calls.lock().unwrap().push("daemon-reload".to_string());
        Ok(())
    }

    fn enable_user_timer(&self, user: &str, unit: &str) -> Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("enable --now {unit} as {user}"));
        Ok(())
    }
}

struct Host {
    _td: tempfile::TempDir,
    user: GuiUser,
    apps: std::path::PathBuf,
    crontab: std::path::PathBuf,
}

fn build_host(root: &Path) -> (GuiUser, std::path::PathBuf, std::path::PathBuf) {
    let home = root.join("home/gui");
    fs::create_dir_all(home.join("Desktop")).unwrap();
    fs::create_dir_all(home.join(".config/autostart")).unwrap();
    fs::create_dir_all(home.join(".securedrop_launcher")).unwrap();
    fs::write(home.join(".securedrop_launcher/settings"), b"interval=300\n").unwrap();
    fs::write(
        home.join("Desktop").join(LEGACY_LAUNCHER_DESKTOP_FILE),
        b"[Desktop Entry]\nName=Launcher\n",
    )
    .unwrap();
    fs::write(
        home.join(".config/autostart").join(LEGACY_AUTOSTART_FILE),
        b"[Desktop Entry]\nName=Login\n",
    )
    .unwrap();

    let apps = root.join("usr/share/applications");
    fs::create_dir_all(&apps).unwrap();
    fs::write(
        apps.join(UPDATER_DESKTOP_FILE),
        b"[Desktop Entry]\nName=Updater\n",
    )
    .unwrap();

    let crontab = root.join("etc/crontab");
    fs::create_dir_all(crontab.parent().unwrap()).unwrap();

    let md = fs::metadata(root).unwrap();
    let user = GuiUser {
        name: "gui".to_string(),
        home,
        uid: md.uid(),
        gid: md.gid(),
    };
    (user, apps, crontab)
}

fn host_with_crontab(content: &str) -> Host {
    let td = tempfile::tempdir().unwrap();
    let (user, apps, crontab) = build_host(td.path());
    fs::write(&crontab, content).unwrap();
    Host {
        _td: td,
        user,
        apps,
        crontab,
    }
}

fn workstation_crontab() -> String {
    format!(
        "0 * * * * root /usr/bin/foreign-job\n\
         {CRON_BLOCK_BEGIN}\n\
         */5 * * * * gui /usr/bin/python3 {CRON_BLOCK_INNER}\n\
         {CRON_BLOCK_END}\n\
         30 2 * * * root /usr/bin/other-job\n"
    )
}

#[test]
fn upgrade_rewrites_the_whole_layout() {
    let host = host_with_crontab(&workstation_crontab());
    let manager = Arc::new(RecordingManager::default());
    let steps = v0_8_0::steps_with_roots(&host.user, manager.clone(), &host.apps, &host.crontab);

    let report = Pipeline::new(JsonlSink, JsonlSink).run(&steps);
    assert!(report.ok(), "errors: {:?}", report.errors);
    assert_eq!(report.executed.len(), 7);

    let home = &host.user.home;
    assert!(!home
        .join("Desktop")
        .join(LEGACY_LAUNCHER_DESKTOP_FILE)
        .exists());
    assert!(!home
        .join(".config/autostart")
        .join(LEGACY_AUTOSTART_FILE)
        .exists());

    assert!(!home.join(".securedrop_launcher").exists());
    assert_eq!(
        fs::read(home.join(".securedrop_updater/settings")).unwrap(),
        b"interval=300\n"
    );

    let autostart_link = home.join(".config/autostart").join(UPDATER_DESKTOP_FILE);
    assert_eq!(
        fs::read_link(&autostart_link).unwrap(),
        host.apps.join(UPDATER_DESKTOP_FILE)
    );

    let installed = home.join("Desktop").join(UPDATER_DESKTOP_FILE);
    assert_eq!(
        fs::read(&installed).unwrap(),
        b"[Desktop Entry]\nName=Updater\n"
    );
    assert_eq!(
        fs::metadata(&installed).unwrap().permissions().mode() & 0o777,
        0o755
    );

    assert_eq!(
        fs::read_to_string(&host.crontab).unwrap(),
        "0 * * * * root /usr/bin/foreign-job\n30 2 * * * root /usr/bin/other-job\n"
    );

    let calls = manager.calls.lock().unwrap();
    assert_eq!(
        calls.as_slice(),
        [
            "daemon-reload".to_string(),
            "enable --now sdw-notify.timer as gui".to_string(),
        ]
    );
}

#[test]
fn foreign_crontab_rolls_the_upgrade_back() {
    let host = host_with_crontab("0 * * * * root /usr/bin/foreign-job\n");
    let manager = Arc::new(RecordingManager::default());
    let steps = v0_8_0::steps_with_roots(&host.user, manager.clone(), &host.apps, &host.crontab);

    let report = Pipeline::new(JsonlSink, JsonlSink).run(&steps);
    assert!(!report.ok());
    assert!(report.rolled_back);
    assert!(report.rollback_errors.is_empty());

    let home = &host.user.home;
    // moved launcher directory is back in place
    assert_eq!(
        fs::read(home.join(".securedrop_launcher/settings")).unwrap(),
        b"interval=300\n"
    );
    assert!(!home.join(".securedrop_updater").exists());
    // symlink and installed entry were undone
    assert!(fs::symlink_metadata(home.join(".config/autostart").join(UPDATER_DESKTOP_FILE)).is_err());
    assert!(!home.join("Desktop").join(UPDATER_DESKTOP_FILE).exists());
    // crontab untouched
    assert_eq!(
        fs::read_to_string(&host.crontab).unwrap(),
        "0 * * * * root /usr/bin/foreign-job\n"
    );
    // the scheduler was never reached
    assert!(manager.calls.lock().unwrap().is_empty());
    // accepted asymmetry: the legacy entries removed early are not resurrected
    assert!(!home
        .join("Desktop")
        .join(LEGACY_LAUNCHER_DESKTOP_FILE)
        .exists());
}

#[test]
fn rerun_after_partial_manual_migration_is_tolerated_up_to_the_crontab() {
    // launcher dir already renamed by hand; the move step short-circuits
    let host = host_with_crontab(&workstation_crontab());
    let home = host.user.home.clone();
    fs::rename(
        home.join(".securedrop_launcher"),
        home.join(".securedrop_updater"),
    )
    .unwrap();

    let manager = Arc::new(RecordingManager::default());
    let steps = v0_8_0::steps_with_roots(&host.user, manager, &host.apps, &host.crontab);
    let report = Pipeline::new(JsonlSink, JsonlSink).run(&steps);

    assert!(report.ok(), "errors: {:?}", report.errors);
    assert_eq!(
        fs::read(home.join(".securedrop_updater/settings")).unwrap(),
        b"interval=300\n"
    );
}

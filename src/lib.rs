pub mod api;
pub mod core;

pub fn init_logging() {
    #[cfg(target_os = "android")]
    {
        init_logging_with_level(log::LevelFilter::Debug);
    }

    #[cfg(not(target_os = "android"))]
    {
        init_logging_with_level(log::LevelFilter::Info);
    }
}

#[cfg(target_os = "android")]
pub fn init_logging_with_level(level: log::LevelFilter) {
    android_logger::init_once(
        android_logger::Config::default()
            .with_max_level(level)
            .with_tag("reminder_lib_rust"),
    );
}

/// 桌面 / CLI 使用 env_logger，`RUST_LOG` 优先于传入的级别；重复调用无副作用
#[cfg(not(target_os = "android"))]
pub fn init_logging_with_level(level: log::LevelFilter) {
    let _ = env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp_secs()
        .try_init();
}

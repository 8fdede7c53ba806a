use std::io::Write;
use std::time::Duration;

use anyhow::Result;
use log::{error, info, warn};

use ecur_bridge::aps::client::Client;
use ecur_bridge::aps::ecu::{EcuResponse, Model};
use ecur_bridge::options::Options;
use ecur_bridge::CARGO_PKG_VERSION;

#[tokio::main]
async fn main() -> Result<()> {
    let options = Options::new();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {} {}] {}",
                chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f"),
                record.level(),
                record.module_path().unwrap_or(""),
                record.args()
            )
        })
        .write_style(env_logger::WriteStyle::Never)
        .init();

    info!(
        "ecur-bridge {} connecting to {}:{}",
        CARGO_PKG_VERSION, options.host, options.port
    );

    let mut client = Client::new(&options.host, options.port, &options.timezone)?;

    let data = match tokio::time::timeout(
        Duration::from_secs(options.timeout),
        client.get_data(),
    )
    .await
    {
        Ok(Ok(data)) => data,
        Ok(Err(e)) => {
            error!("could not read from ECU-R: {:#}", e);
            std::process::exit(1);
        }
        Err(_) => {
            error!(
                "timed out after {}s talking to {}:{}",
                options.timeout, options.host, options.port
            );
            std::process::exit(1);
        }
    };

    if let Err(e) = client.close().await {
        warn!("could not close connection cleanly: {:#}", e);
    }

    if options.json {
        println!("{}", serde_json::to_string(&data)?);
    } else {
        print_summary(&data);
    }

    Ok(())
}

fn print_summary(data: &EcuResponse) {
    let ecu = &data.ecu_info;
    println!("ECU information:");
    println!("  {:<20} {}", "ECU ID", ecu.ecu_id);
    println!("  {:<20} {}", "Software version", ecu.version);
    println!(
        "  {:<20} {}/{} online/registered",
        "Inverters", ecu.inverters_online, ecu.inverters_registered
    );
    println!(
        "  {:<20} {:.1} kWh",
        "Lifetime production",
        ecu.lifetime_energy as f64 / 1000.0
    );
    println!(
        "  {:<20} {:.3} kWh",
        "Today's production",
        ecu.today_energy as f64 / 1000.0
    );
    println!("  {:<20} {} W", "Current power", ecu.last_power);
    println!("  {:<20} {}", "Ethernet MAC", ecu.ethernet_mac);
    println!("  {:<20} {}", "WiFi MAC", ecu.wireless_mac);
    println!(
        "  {:<20} {}",
        "Last update",
        data.array_info.timestamp.format("%Y-%m-%d %H:%M:%S")
    );

    for (n, inverter) in data.array_info.inverters.iter().enumerate() {
        println!();
        println!("Inverter {}:", inverter.id);
        println!("  {:<20} {}", "Model", inverter.model.name());
        println!("  {:<20} {}", "Online", inverter.online);
        if let Some(entry) = data.signal_info.inverters.get(n) {
            println!(
                "  {:<20} {:.1} %",
                "Signal",
                f64::from(entry.signal) / 2.56
            );
        }
        match &inverter.model {
            Model::Yc600 {
                frequency,
                temperature,
                power_a,
                voltage_a,
                power_b,
            } => {
                println!("  {:<20} {:.2} Hz", "Frequency", frequency);
                println!("  {:<20} {} C", "Temperature", temperature);
                println!("  {:<20} {} V", "Voltage A", voltage_a);
                println!("  {:<20} {} W", "Power A", power_a);
                println!("  {:<20} {} W", "Power B", power_b);
            }
            Model::Yc1000 {
                frequency,
                temperature,
                power_a,
                voltage_a,
                power_b,
                power_c,
                power_d,
            }
            | Model::Qs1 {
                frequency,
                temperature,
                power_a,
                voltage_a,
                power_b,
                power_c,
                power_d,
            } => {
                println!("  {:<20} {:.2} Hz", "Frequency", frequency);
                println!("  {:<20} {} C", "Temperature", temperature);
                println!("  {:<20} {} V", "Voltage A", voltage_a);
                println!("  {:<20} {} W", "Power A", power_a);
                println!("  {:<20} {} W", "Power B", power_b);
                println!("  {:<20} {} W", "Power C", power_c);
                println!("  {:<20} {} W", "Power D", power_d);
            }
            Model::Other => {}
        }
    }
}

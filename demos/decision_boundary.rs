use nn_playground::{Network, SessionConfig, TrainingSession, presets};

fn main() -> nn_playground::Result<()> {
    let net = Network::with_seed(&[2, 8, 1], 0.5, 1)?;
    let mut session = TrainingSession::from_preset(net, &presets::xor(), SessionConfig::default())?;
    session.run(2_000)?;
    let net = session.network();

    // Boundary as CSV, then the steepest spot of the gradient field.
    println!("x,y,value");
    for p in net.decision_boundary(0.0, 1.0, 0.0, 1.0, 10)? {
        println!("{:.2},{:.2},{:.4}", p.x, p.y, p.value);
    }

    let field = net.gradient_field(0.0, 1.0, 0.0, 1.0, 10)?;
    if let Some(p) = field
        .iter()
        .max_by(|a, b| a.dx.hypot(a.dy).total_cmp(&b.dx.hypot(b.dy)))
    {
        println!(
            "steepest at ({:.2}, {:.2}): |grad|={:.4}",
            p.x,
            p.y,
            p.dx.hypot(p.dy)
        );
    }
    Ok(())
}

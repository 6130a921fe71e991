use nn_playground::{Network, presets};

fn main() -> nn_playground::Result<()> {
    // 2 -> 4 -> 1, sigmoid everywhere.
    let mut net = Network::with_seed(&[2, 4, 1], 0.5, 0)?;
    let xor = presets::xor();

    for epoch in 0..5_000 {
        let mut total = 0.0;
        for ex in &xor.examples {
            total += net.train(&ex.inputs, &[ex.target])?;
        }
        if epoch % 1_000 == 0 {
            println!("epoch={epoch} mse={}", total / xor.examples.len() as f64);
        }
    }

    for ex in &xor.examples {
        let y = net.forward(&ex.inputs)?;
        println!("x={:?} y={:.4} target={}", ex.inputs, y[0], ex.target);
    }

    let latest = net.training_points().latest();
    println!("logged points={} latest={latest:?}", net.training_points().len());
    Ok(())
}

use nn_playground::{Activation, Network, presets};

fn main() -> nn_playground::Result<()> {
    let mut net = Network::with_seed(&[2, 3, 1], 0.3, 0)?;
    net.set_activation(Activation::Tanh);

    let and = presets::and();
    for _ in 0..500 {
        for ex in &and.examples {
            net.train(&ex.inputs, &[ex.target])?;
        }
    }

    let dir = std::env::temp_dir().join("nn-playground-demo");
    std::fs::create_dir_all(&dir)?;
    let path = dir.join("and_tanh.json");
    net.save_json(&path)?;

    let loaded = Network::load_json(&path)?;
    for ex in &and.examples {
        let a = net.forward(&ex.inputs)?;
        let b = loaded.forward(&ex.inputs)?;
        assert_eq!(a, b);
        println!("x={:?} y={:.4}", ex.inputs, b[0]);
    }
    println!("saved and loaded network: {}", path.display());
    println!("{}", loaded.to_json_string_pretty()?);
    Ok(())
}

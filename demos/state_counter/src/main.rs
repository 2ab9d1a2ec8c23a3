use repose_devtools::Inspector;
use repose_state::{GlobalState, GlobalStore, Scope, StoreConfig};

struct CounterView {
    scope: Scope,
    count: repose_state::StateBinding<i32>,
    double: repose_state::StateBinding<i32>,
}

impl CounterView {
    fn mount(store: &GlobalStore) -> anyhow::Result<Self> {
        let scope = Scope::new();
        let (count, double) = scope.run(|| -> anyhow::Result<_> {
            Ok((
                store.use_global_state::<i32>("counter")?,
                store.use_global_state::<i32>("double")?,
            ))
        })?;
        Ok(Self {
            scope,
            count,
            double,
        })
    }

    fn render(&self) -> String {
        format!("Count: {}  Double: {}", self.count.get(), self.double.get())
    }

    fn increment(&self) -> anyhow::Result<()> {
        self.count.update(|c| c + 1)?;
        Ok(())
    }

    fn unmount(self) {
        self.scope.dispose();
    }
}

async fn fetch_remote_count() -> Result<i32, String> {
    Ok(40)
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let store = GlobalStore::with_config(StoreConfig::from_env());
    let counter: GlobalState<i32> = store.create_global_state("counter", 0);
    store.define_derived("double", |s| Ok(s.get::<i32>("counter")? * 2), ["counter"])?;

    let inspector = Inspector::attach(&store);
    inspector.toggle();

    let view = CounterView::mount(&store)?;
    println!("{}", view.render());

    view.increment()?;
    view.increment()?;
    println!("{}", view.render());

    pollster::block_on(counter.set_async(fetch_remote_count))?;
    println!("{}", view.render());

    pollster::block_on(counter.set_async(|| async { Err::<i32, _>("offline") }))?;
    println!("{}", view.render());

    view.unmount();
    log::info!("listeners left on `counter`: {}", store.listener_count("counter"));

    println!("--- state log ---");
    for line in inspector.lines() {
        println!("{line}");
    }
    Ok(())
}
